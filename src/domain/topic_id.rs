use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Serialize, Serializer};

/// One `.`-separated segment of a [`TopicId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A run of ASCII digits, kept exactly as written (leading zeros survive).
    Number(String),
    /// A single alphabetic character, lowercased.
    ///
    /// A letter segment is only ever the last segment of an ID.
    Letter(String),
}

impl Segment {
    /// Returns the segment text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Number(s) | Self::Letter(s) => s,
        }
    }

    /// Returns `true` for numeric segments.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Numeric-aware comparison.
    ///
    /// Numbers compare by value, letters compare as strings, and at the same
    /// position a number always sorts before a letter.
    fn cmp_numeric(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => cmp_digits(a, b),
            (Self::Letter(a), Self::Letter(b)) => a.cmp(b),
            (Self::Number(_), Self::Letter(_)) => Ordering::Less,
            (Self::Letter(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compares two digit strings by integer value without parsing them, so
/// arbitrarily long numbers order correctly.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// The identifier of a numbered topic, such as `2`, `2.1` or `18.3.a`.
///
/// Grammar: one or more numeric segments separated by `.`, optionally followed
/// by exactly one single-letter segment.
///
/// - Valid: `2`, `2.1`, `2.1.a`, `10.4.B`
/// - Invalid: `.2`, `2.`, `2..1`, `2.a.1`, `a`, `Topic 2`
///
/// Letter segments are lowercased; numeric segments are kept verbatim. The
/// trimmed input text is retained as [`TopicId::raw`], which is the key
/// used by the node table.
///
/// IDs order numerically segment by segment, so `2.2 < 2.10 < 2.10.a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicId {
    raw: String,
    segments: Vec<Segment>,
}

impl TopicId {
    /// Parses a candidate token, returning `None` if it does not match the
    /// grammar.
    ///
    /// This never fails loudly: malformed input is ordinary negative
    /// information. Use [`str::parse`] to learn why a token was rejected.
    ///
    /// ```
    /// use topicmap::TopicId;
    ///
    /// let id = TopicId::parse("2.1.A").unwrap();
    /// assert_eq!(id.raw(), "2.1.A");
    /// assert_eq!(id.parts().collect::<Vec<_>>(), ["2", "1", "a"]);
    /// assert_eq!(id.level(), 3);
    ///
    /// assert!(TopicId::parse("2.a.1").is_none());
    /// ```
    #[must_use]
    pub fn parse(candidate: &str) -> Option<Self> {
        candidate.parse().ok()
    }

    /// The source text of the ID, with surrounding whitespace removed.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The segment strings, letters lowercased.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(Segment::as_str)
    }

    /// Depth of the ID in the hierarchy; always equal to the number of parts.
    #[must_use]
    pub fn level(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for single-segment IDs, which have no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// The parts joined with `.`.
    ///
    /// Equal to [`TopicId::raw`] except that letters are lowercased.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.parts().collect::<Vec<_>>().join(".")
    }

    /// The ID formed by dropping the last segment, or `None` for a root.
    ///
    /// The parent's raw form is its canonical form.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let segments = self.segments[..self.segments.len() - 1].to_vec();
        let raw = segments
            .iter()
            .map(Segment::as_str)
            .collect::<Vec<_>>()
            .join(".");
        Some(Self { raw, segments })
    }

    /// Iterates over the ancestor IDs, nearest first.
    ///
    /// For `18.3.a` this yields `18.3` then `18`.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> {
        std::iter::successors(self.parent(), Self::parent)
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for TopicId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl Ord for TopicId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments
            .iter()
            .zip(&other.segments)
            .map(|(a, b)| a.cmp_numeric(b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| self.segments.len().cmp(&other.segments.len()))
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for TopicId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reasons a token is not a valid topic ID.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The token is empty or only whitespace.
    #[error("Invalid topic ID: empty")]
    Empty,

    /// The token has an empty segment (`.2`, `2.`, `2..1`).
    #[error("Invalid topic ID '{0}': empty segment")]
    EmptySegment(String),

    /// A segment is neither all digits nor a single letter.
    #[error("Invalid topic ID '{id}': segment '{segment}' is neither a number nor a single letter")]
    InvalidSegment {
        /// The rejected token.
        id: String,
        /// The offending segment.
        segment: String,
    },

    /// The token starts with a letter segment.
    #[error("Invalid topic ID '{0}': must start with a number")]
    LeadingLetter(String),

    /// The token has more than one letter segment.
    #[error("Invalid topic ID '{0}': at most one letter segment is allowed")]
    SecondLetter(String),

    /// A numeric segment follows the letter segment (`2.a.1`).
    #[error("Invalid topic ID '{0}': the letter segment must be last")]
    NumberAfterLetter(String),
}

impl FromStr for TopicId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(Error::Empty);
        }

        let mut segments = Vec::new();
        let mut seen_letter = false;

        for segment in raw.split('.') {
            if segment.is_empty() {
                return Err(Error::EmptySegment(raw.to_string()));
            }

            if segment.bytes().all(|b| b.is_ascii_digit()) {
                if seen_letter {
                    return Err(Error::NumberAfterLetter(raw.to_string()));
                }
                segments.push(Segment::Number(segment.to_string()));
            } else if let Some(letter) = single_letter(segment) {
                if seen_letter {
                    return Err(Error::SecondLetter(raw.to_string()));
                }
                if segments.is_empty() {
                    return Err(Error::LeadingLetter(raw.to_string()));
                }
                seen_letter = true;
                segments.push(Segment::Letter(letter.to_lowercase().collect()));
            } else {
                return Err(Error::InvalidSegment {
                    id: raw.to_string(),
                    segment: segment.to_string(),
                });
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }
}

impl TryFrom<&str> for TopicId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}

fn single_letter(segment: &str) -> Option<char> {
    let mut chars = segment.chars();
    let c = chars.next()?;
    (chars.next().is_none() && c.is_alphabetic()).then_some(c)
}
