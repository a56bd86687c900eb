use std::fmt;

use serde::Serialize;

use crate::domain::TopicId;

/// Relation kind assigned to every reference found by the detector.
pub const EXPLICIT: &str = "explicit";

/// The part of a block in which a reference was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// The title on the header line.
    Title,
    /// The block body below the header line.
    Paragraph,
    /// A subclause inside the body.
    Subclause,
}

impl RegionKind {
    /// Returns the region name as used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Paragraph => "paragraph",
            Self::Subclause => "subclause",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inline mention of one topic from inside another.
///
/// One reference is recorded per occurrence; repeated mentions are not merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// The topic whose block contains the mention.
    pub source: TopicId,

    /// The topic being mentioned.
    pub target: TopicId,

    /// How the reference was established (always [`EXPLICIT`] at detection).
    pub relation: String,

    /// Absolute byte offset of the marker word.
    pub start: usize,

    /// Absolute byte offset one past the mention, trailing punctuation
    /// included.
    pub end: usize,

    /// Where in the block the mention was found.
    pub region: RegionKind,

    /// The subclause label, for mentions inside a subclause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_label: Option<String>,
}

/// The kind of structural problem with a reference target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The target topic does not exist in the hierarchy.
    Missing,
    /// The target exists only as a synthetic placeholder with no content.
    Placeholder,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Missing => "missing",
            Self::Placeholder => "placeholder",
        })
    }
}

/// A reference occurrence whose target is absent or a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceIssue {
    /// The topic containing the reference.
    pub source: TopicId,
    /// The offending target.
    pub target: TopicId,
    /// What is wrong with the target.
    pub kind: IssueKind,
    /// Start of the reference span.
    pub start: usize,
    /// End of the reference span.
    pub end: usize,
}
