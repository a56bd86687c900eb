//! Header detection.
//!
//! A single forward pass over the document's lines. Each non-blank line is
//! matched against three mutually exclusive header shapes, in precedence
//! order:
//!
//! 1. keyword-led: `TOPIC 2.1: Definitions`
//! 2. ID only: `3.5.2`
//! 3. ID-led with a title: `2.1 Definitions`

use tracing::{instrument, trace};

use crate::domain::{Config, TopicId};

/// Which header shape matched a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Marker word, ID, colon, optional title.
    Keyword,
    /// The whole line is a single ID.
    IdOnly,
    /// An ID followed by a title.
    IdWithTitle,
}

/// A line recognised as a topic header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCandidate {
    /// The parsed topic ID.
    pub topic_id: TopicId,

    /// Title text from the line, if any.
    pub title: Option<String>,

    /// Byte offset of the start of the line.
    pub offset: usize,

    /// The full line, without its terminator.
    pub line: String,

    /// The shape that matched.
    pub pattern: Pattern,
}

/// Finds header lines in normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDetector {
    keyword: String,
    standalone_max: u64,
}

impl Default for HeaderDetector {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl HeaderDetector {
    /// Creates a detector using the given marker word and standalone ID
    /// threshold.
    #[must_use]
    pub fn new(keyword: impl Into<String>, standalone_max: u64) -> Self {
        Self {
            keyword: keyword.into(),
            standalone_max,
        }
    }

    /// Creates a detector from the configured marker word and threshold.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.header_keyword(), config.standalone_max)
    }

    /// Returns the header candidates in document order.
    ///
    /// Offsets are strictly increasing.
    #[instrument(level = "debug", skip_all, fields(len = text.len()))]
    pub fn detect(&self, text: &str) -> Vec<HeaderCandidate> {
        let mut headers = Vec::new();
        let mut offset = 0;

        for raw_line in text.split_inclusive('\n') {
            let start = offset;
            offset += raw_line.len();

            let line = raw_line.trim_end_matches(['\n', '\r']);
            let Some((pattern, topic_id, title)) = self.classify(line) else {
                continue;
            };

            trace!(%topic_id, offset = start, ?pattern, "detected header");
            headers.push(HeaderCandidate {
                topic_id,
                title,
                offset: start,
                line: line.to_string(),
                pattern,
            });
        }

        headers
    }

    fn classify(&self, line: &str) -> Option<(Pattern, TopicId, Option<String>)> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        // A line led by the marker word is either a keyword header or nothing.
        if let Some(rest) = strip_prefix_ignore_case(trimmed, &self.keyword) {
            let (id, title) = rest.trim_start().split_once(':')?;
            let topic_id = TopicId::parse(id)?;
            return Some((Pattern::Keyword, topic_id, non_empty(title)));
        }

        if !trimmed.contains(char::is_whitespace) {
            let topic_id = TopicId::parse(trimmed)?;
            return self
                .accept_standalone(&topic_id)
                .then_some((Pattern::IdOnly, topic_id, None));
        }

        let (id, title) = trimmed.split_once(char::is_whitespace)?;
        let topic_id = TopicId::parse(id)?;
        let title = non_empty(title)?;
        if title.ends_with('.') {
            return None;
        }
        Some((Pattern::IdWithTitle, topic_id, Some(title)))
    }

    /// Single numbers above the threshold are taken for years or page
    /// numbers.
    fn accept_standalone(&self, topic_id: &TopicId) -> bool {
        match topic_id.segments() {
            [segment] if segment.is_number() => segment
                .as_str()
                .parse::<u64>()
                .is_ok_and(|value| value <= self.standalone_max),
            _ => true,
        }
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
