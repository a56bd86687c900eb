//! Cutting a document into topic blocks.

use tracing::{debug, instrument};

use crate::{
    domain::{Subclause, TopicBlock},
    structure::header::HeaderCandidate,
};

/// A violation of the segmentation precondition.
///
/// Headers must be sorted by strictly increasing offset, and every offset
/// must fall on a character boundary inside the text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A header does not come after the one before it.
    #[error("header at offset {offset} does not follow the header at offset {previous}")]
    Unsorted {
        /// Offset of the preceding header.
        previous: usize,
        /// Offset of the out-of-order header.
        offset: usize,
    },

    /// A header lies beyond the end of the text.
    #[error("header offset {offset} is beyond the end of the text (length {len})")]
    OutOfBounds {
        /// The offending offset.
        offset: usize,
        /// The text length in bytes.
        len: usize,
    },

    /// A header offset splits a multi-byte character.
    #[error("header offset {offset} is not on a character boundary")]
    NotCharBoundary {
        /// The offending offset.
        offset: usize,
    },
}

/// Splits `text` into blocks bounded by consecutive header offsets.
///
/// Block *i* spans from header *i* to header *i + 1*, or to the end of the
/// text for the last header. Text before the first header is not part of any
/// block (see [`preamble`]). Subclauses are left empty.
///
/// # Errors
///
/// Returns an error if the headers are not sorted by strictly increasing
/// offset, or if an offset is outside the text or not on a character
/// boundary.
#[instrument(level = "debug", skip_all, fields(headers = headers.len()))]
pub fn segment(text: &str, headers: &[HeaderCandidate]) -> Result<Vec<TopicBlock>, Error> {
    validate(text, headers)?;

    let ends = headers
        .iter()
        .skip(1)
        .map(|header| header.offset)
        .chain(std::iter::once(text.len()));

    let blocks: Vec<_> = headers
        .iter()
        .zip(ends)
        .map(|(header, end)| TopicBlock {
            topic_id: Some(header.topic_id.clone()),
            title: header.title.clone(),
            text: text[header.offset..end].to_string(),
            start: header.offset,
            end,
            subclauses: Vec::new(),
        })
        .collect();

    debug!(blocks = blocks.len(), "segmented document");
    Ok(blocks)
}

fn validate(text: &str, headers: &[HeaderCandidate]) -> Result<(), Error> {
    let mut previous: Option<usize> = None;

    for header in headers {
        let offset = header.offset;
        if offset > text.len() {
            return Err(Error::OutOfBounds {
                offset,
                len: text.len(),
            });
        }
        if !text.is_char_boundary(offset) {
            return Err(Error::NotCharBoundary { offset });
        }
        if let Some(previous) = previous.filter(|&previous| previous >= offset) {
            return Err(Error::Unsorted { previous, offset });
        }
        previous = Some(offset);
    }

    Ok(())
}

/// The text before the first header, as a block without a topic ID.
///
/// Returns `None` when the trimmed preamble is shorter than `min_length`
/// characters. Without any headers the whole text is the preamble.
///
/// Headers are expected to satisfy the same precondition as [`segment`]; an
/// out-of-range first offset yields `None`.
#[must_use]
pub fn preamble(text: &str, headers: &[HeaderCandidate], min_length: usize) -> Option<TopicBlock> {
    let end = headers.first().map_or(text.len(), |header| header.offset);
    let slice = text.get(..end)?;

    if slice.trim().chars().count() < min_length {
        debug!(len = slice.len(), "dropping short preamble");
        return None;
    }

    Some(TopicBlock {
        topic_id: None,
        title: None,
        text: slice.to_string(),
        start: 0,
        end,
        subclauses: Vec::new(),
    })
}

/// Finds `(a)`-style subclauses in the body of a block.
///
/// A subclause starts at a line whose trimmed text begins with a
/// parenthesised label of one to three ASCII letters or digits, and runs to
/// the next such line or the end of the block.
#[must_use]
pub fn extract_subclauses(block: &TopicBlock) -> Vec<Subclause> {
    let (body_start, body) = block.body();

    let mut starts: Vec<(usize, String)> = Vec::new();
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if let Some(label) = subclause_label(line) {
            starts.push((offset, label));
        }
        offset += line.len();
    }

    let ends = starts
        .iter()
        .skip(1)
        .map(|(start, _)| *start)
        .chain(std::iter::once(body.len()));

    starts
        .iter()
        .zip(ends)
        .map(|((start, label), end)| Subclause {
            label: label.clone(),
            text: body[*start..end].to_string(),
            start: body_start + start,
            end: body_start + end,
        })
        .collect()
}

fn subclause_label(line: &str) -> Option<String> {
    let rest = line.trim_start().strip_prefix('(')?;
    let (label, _) = rest.split_once(')')?;
    let valid = (1..=3).contains(&label.len()) && label.bytes().all(|b| b.is_ascii_alphanumeric());
    valid.then(|| label.to_ascii_lowercase())
}
