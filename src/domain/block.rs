use serde::Serialize;

use crate::domain::TopicId;

/// A contiguous slice of the document that starts at a header line.
///
/// Blocks own their text. A block with no topic ID holds orphan content, such
/// as a retained preamble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicBlock {
    /// The topic this block introduces, if any.
    pub topic_id: Option<TopicId>,

    /// Title text from the header line.
    pub title: Option<String>,

    /// The block text, header line included.
    pub text: String,

    /// Byte offset of the first character of the block.
    pub start: usize,

    /// Byte offset one past the last character of the block.
    pub end: usize,

    /// Lettered sub-units found in the block body.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subclauses: Vec<Subclause>,
}

impl TopicBlock {
    /// The block text after the header line, with its absolute offset.
    ///
    /// Empty when the block is a single line.
    #[must_use]
    pub fn body(&self) -> (usize, &str) {
        if self.topic_id.is_none() {
            return (self.start, &self.text);
        }
        self.text.find('\n').map_or((self.end, ""), |newline| {
            (self.start + newline + 1, &self.text[newline + 1..])
        })
    }

    /// The header line without its line terminator.
    #[must_use]
    pub fn header_line(&self) -> &str {
        let line = self.text.split('\n').next().unwrap_or_default();
        line.strip_suffix('\r').unwrap_or(line)
    }

    /// The title with the absolute offset at which it appears on the header
    /// line.
    ///
    /// Titles are trimmed suffixes of the header line, so the position is
    /// exact.
    #[must_use]
    pub fn title_span(&self) -> Option<(usize, &str)> {
        let title = self.title.as_deref()?;
        let line = self.header_line().trim_end();
        line.ends_with(title).then(|| (self.start + line.len() - title.len(), title))
    }
}

/// A lettered or numbered sub-unit inside a block, such as `(a)`.
///
/// Subclauses are local structure: they never become nodes in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subclause {
    /// The label without parentheses, lowercased (`a`, `iv`, `1`).
    pub label: String,

    /// The subclause text.
    pub text: String,

    /// Absolute byte offset of the subclause start.
    pub start: usize,

    /// Absolute byte offset one past the subclause end.
    pub end: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str, title: Option<&str>) -> TopicBlock {
        TopicBlock {
            topic_id: TopicId::parse("1"),
            title: title.map(str::to_string),
            text: text.to_string(),
            start: 100,
            end: 100 + text.len(),
            subclauses: Vec::new(),
        }
    }

    #[test]
    fn body_skips_header_line() {
        let block = block("TOPIC 1: Scope\nSee Topic 2.\n", Some("Scope"));
        assert_eq!(block.body(), (115, "See Topic 2.\n"));
    }

    #[test]
    fn single_line_block_has_empty_body() {
        let block = block("1 Scope", Some("Scope"));
        assert_eq!(block.body(), (107, ""));
    }

    #[test]
    fn orphan_body_is_whole_text() {
        let mut block = block("Preamble text\nmore\n", None);
        block.topic_id = None;
        assert_eq!(block.body(), (100, "Preamble text\nmore\n"));
    }

    #[test]
    fn title_span_is_exact() {
        let block = block("TOPIC 1: 1 and Topic 3  \nbody", Some("1 and Topic 3"));
        let (offset, title) = block.title_span().unwrap();
        assert_eq!(title, "1 and Topic 3");
        assert_eq!(&block.text[offset - 100..offset - 100 + title.len()], title);
        assert_eq!(offset, 109);
    }

    #[test]
    fn no_title_no_span() {
        assert!(block("3.5.2\nbody", None).title_span().is_none());
    }
}
