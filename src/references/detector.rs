//! Detection of explicit inline references such as `see Topic 4.2`.

use regex::Regex;
use tracing::{instrument, trace};

use crate::domain::{Config, Reference, RegionKind, TopicBlock, TopicId, reference::EXPLICIT};

/// Punctuation that may trail a mention. It is stripped before the token is
/// parsed, but kept in the recorded span.
const TRAILING: &[char] = &['.', ',', ';', ')', ']'];

/// A single mention found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    /// The mentioned topic.
    pub target: TopicId,
    /// Offset of the marker word, relative to the scanned text.
    pub start: usize,
    /// Offset one past the mention, relative to the scanned text.
    pub end: usize,
}

/// Scans topic blocks for a marker word followed by a topic ID.
#[derive(Debug, Clone)]
pub struct ReferenceDetector {
    marker: Regex,
}

impl ReferenceDetector {
    /// Creates a detector for the given marker word, matched
    /// case-insensitively as a whole word.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker pattern cannot be compiled.
    pub fn new(keyword: &str) -> Result<Self, regex::Error> {
        let marker = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword)))?;
        Ok(Self { marker })
    }

    /// Creates a detector for the configured reference marker word.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker pattern cannot be compiled.
    pub fn from_config(config: &Config) -> Result<Self, regex::Error> {
        Self::new(config.reference_keyword())
    }

    /// Finds every mention in `text`, in order.
    ///
    /// Tokens that are not valid topic IDs are skipped.
    #[must_use]
    pub fn mentions(&self, text: &str) -> Vec<Mention> {
        self.marker
            .find_iter(text)
            .filter_map(|marker| mention_after(text, marker.start(), marker.end()))
            .collect()
    }

    /// Detects references in the title, paragraph and subclauses of every
    /// block that has a topic ID.
    ///
    /// One reference is produced per occurrence. Mentions inside a subclause
    /// are attributed to the subclause only.
    #[instrument(level = "debug", skip_all, fields(blocks = blocks.len()))]
    pub fn detect(&self, blocks: &[TopicBlock]) -> Vec<Reference> {
        let mut references = Vec::new();

        for block in blocks {
            let Some(source) = &block.topic_id else {
                continue;
            };

            let mut push = |base: usize, mention: Mention, region, label: Option<&str>| {
                let reference = Reference {
                    source: source.clone(),
                    target: mention.target,
                    relation: EXPLICIT.to_string(),
                    start: base + mention.start,
                    end: base + mention.end,
                    region,
                    region_label: label.map(str::to_string),
                };
                trace!(
                    source = %reference.source,
                    target = %reference.target,
                    region = %reference.region,
                    "detected reference"
                );
                references.push(reference);
            };

            if let Some((base, title)) = block.title_span() {
                for mention in self.mentions(title) {
                    push(base, mention, RegionKind::Title, None);
                }
            }

            let (base, body) = block.body();
            for mention in self.mentions(body) {
                let start = base + mention.start;
                let in_subclause = block
                    .subclauses
                    .iter()
                    .any(|subclause| (subclause.start..subclause.end).contains(&start));
                if !in_subclause {
                    push(base, mention, RegionKind::Paragraph, None);
                }
            }

            for subclause in &block.subclauses {
                for mention in self.mentions(&subclause.text) {
                    push(
                        subclause.start,
                        mention,
                        RegionKind::Subclause,
                        Some(&subclause.label),
                    );
                }
            }
        }

        references
    }
}

/// Reads the topic ID token that follows a marker word ending at `after`.
fn mention_after(text: &str, start: usize, after: usize) -> Option<Mention> {
    let rest = &text[after..];
    let token_start = after + (rest.len() - rest.trim_start().len());

    let token_len = text[token_start..]
        .find(|c: char| !(c.is_alphanumeric() || c == '.'))
        .unwrap_or(text.len() - token_start);
    if token_len == 0 {
        return None;
    }

    let token = &text[token_start..token_start + token_len];
    let target = TopicId::parse(token.trim_end_matches(TRAILING))?;

    let tail = &text[token_start + token_len..];
    let end = text.len() - tail.trim_start_matches(TRAILING).len();

    Some(Mention { target, start, end })
}
