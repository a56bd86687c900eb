//! Loading and normalizing plain-text documents.
//!
//! Analysis expects a single normalized string: consistent line endings,
//! Unicode-normalized, free of stray control characters. Nothing here
//! interprets structure.

use std::{
    io,
    path::{Path, PathBuf},
};

use tracing::instrument;
use unicode_normalization::UnicodeNormalization;

use crate::Config;

/// Errors that can occur when loading a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file does not exist.
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

/// Reads a document from disk.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
/// rejected. The result is not normalized; see [`normalize`].
///
/// # Errors
///
/// Returns an error if the file does not exist or cannot be read.
#[instrument]
pub fn load(path: &Path) -> Result<String, Error> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            Error::NotFound(path.to_path_buf())
        } else {
            Error::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Which normalization steps to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Normalize {
    /// Apply Unicode NFKC normalization (fullwidth digits become ASCII).
    pub unicode: bool,
    /// Replace ASCII control characters other than tab and line breaks with a
    /// space.
    pub control_chars: bool,
    /// Convert `\r\n` and lone `\r` to `\n`.
    pub line_endings: bool,
    /// Strip trailing whitespace from every line.
    pub trailing_whitespace: bool,
}

impl Default for Normalize {
    fn default() -> Self {
        Self {
            unicode: true,
            control_chars: true,
            line_endings: true,
            trailing_whitespace: true,
        }
    }
}

impl From<&Config> for Normalize {
    fn from(config: &Config) -> Self {
        Self {
            unicode: config.normalize_unicode,
            ..Self::default()
        }
    }
}

/// Normalizes raw text for analysis.
///
/// Steps run in order: Unicode NFKC, control character replacement, line
/// ending conversion, trailing whitespace removal.
#[must_use]
pub fn normalize(text: &str, options: &Normalize) -> String {
    let mut text = if options.unicode {
        text.nfkc().collect()
    } else {
        text.to_string()
    };

    if options.control_chars {
        text = text
            .chars()
            .map(|c| {
                if c.is_ascii_control() && !matches!(c, '\t' | '\n' | '\r' | '\x7f') {
                    ' '
                } else {
                    c
                }
            })
            .collect();
    }

    if options.line_endings {
        text = text.replace("\r\n", "\n").replace('\r', "\n");
    }

    if options.trailing_whitespace {
        text = text
            .split('\n')
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n");
    }

    text
}

/// Loads a document and normalizes it according to the configuration.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn load_normalized(path: &Path, config: &Config) -> Result<String, Error> {
    Ok(normalize(&load(path)?, &Normalize::from(config)))
}
