use std::{io, path::Path};

use serde::{Deserialize, Serialize};

/// Configuration for topic mapping.
///
/// Controls the marker words used by header and reference detection, the
/// heuristics applied to ambiguous lines, and the policies for duplicate IDs
/// and text before the first header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Marker word that introduces a keyword-led header (`TOPIC 2.1: Title`).
    header_keyword: String,

    /// Marker word that introduces an inline reference (`see Topic 4.2`).
    reference_keyword: String,

    /// Standalone single-number lines above this value are not headers.
    ///
    /// Such lines are usually years or page numbers.
    pub standalone_max: u64,

    /// Which block wins when several blocks share a topic ID.
    pub duplicates: DuplicatePolicy,

    /// What to do with text that precedes the first header.
    pub preamble: PreamblePolicy,

    /// Minimum trimmed length of a preamble kept as an orphan block.
    pub orphan_min_length: usize,

    /// Whether to extract `(a)`-style subclauses from block bodies.
    pub subclauses: bool,

    /// Whether ingestion applies Unicode NFKC normalization.
    pub normalize_unicode: bool,

    /// Largest run of missing sibling numbers filled with placeholder topics.
    ///
    /// Zero disables sibling gap filling. Missing ancestors are always filled.
    pub max_sibling_gap: u64,
}

/// Resolution for blocks that share a topic ID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The first block in document order is kept; later ones are discarded.
    #[default]
    FirstWins,
    /// The last block in document order is kept; earlier ones are discarded.
    LastWins,
}

/// Treatment of text before the first detected header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreamblePolicy {
    /// The preamble is discarded.
    #[default]
    Drop,
    /// The preamble is kept as a block without a topic ID.
    Orphan,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header_keyword: default_header_keyword(),
            reference_keyword: default_reference_keyword(),
            standalone_max: default_standalone_max(),
            duplicates: DuplicatePolicy::default(),
            preamble: PreamblePolicy::default(),
            orphan_min_length: default_orphan_min_length(),
            subclauses: false,
            normalize_unicode: true,
            max_sibling_gap: default_max_sibling_gap(),
        }
    }
}

/// Errors that can occur when loading or saving a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file could not be read.
    #[error("Failed to read config file: {0}")]
    Read(io::Error),

    /// The file is not valid configuration TOML.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The file could not be written.
    #[error("Failed to write config file: {0}")]
    Write(io::Error),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(Error::Read)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(Error::Write)
    }

    /// The marker word for keyword-led headers.
    #[must_use]
    pub fn header_keyword(&self) -> &str {
        &self.header_keyword
    }

    /// The marker word for inline references.
    #[must_use]
    pub fn reference_keyword(&self) -> &str {
        &self.reference_keyword
    }

    /// Sets the header marker word. Blank values restore the default.
    pub fn set_header_keyword(&mut self, keyword: &str) {
        self.header_keyword = non_blank_or(keyword, default_header_keyword);
    }

    /// Sets the reference marker word. Blank values restore the default.
    pub fn set_reference_keyword(&mut self, keyword: &str) {
        self.reference_keyword = non_blank_or(keyword, default_reference_keyword);
    }
}

fn non_blank_or(value: &str, default: fn() -> String) -> String {
    let value = value.trim();
    if value.is_empty() {
        default()
    } else {
        value.to_string()
    }
}

fn default_header_keyword() -> String {
    "TOPIC".to_string()
}

fn default_reference_keyword() -> String {
    "topic".to_string()
}

const fn default_standalone_max() -> u64 {
    50
}

const fn default_orphan_min_length() -> usize {
    20
}

const fn default_max_sibling_gap() -> u64 {
    10
}

const fn default_true() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_header_keyword")]
        header_keyword: String,

        #[serde(default = "default_reference_keyword")]
        reference_keyword: String,

        #[serde(default = "default_standalone_max")]
        standalone_max: u64,

        #[serde(default)]
        duplicates: DuplicatePolicy,

        #[serde(default)]
        preamble: PreamblePolicy,

        #[serde(default = "default_orphan_min_length")]
        orphan_min_length: usize,

        #[serde(default)]
        subclauses: bool,

        #[serde(default = "default_true")]
        normalize_unicode: bool,

        #[serde(default = "default_max_sibling_gap")]
        max_sibling_gap: u64,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                header_keyword,
                reference_keyword,
                standalone_max,
                duplicates,
                preamble,
                orphan_min_length,
                subclauses,
                normalize_unicode,
                max_sibling_gap,
            } => Self {
                header_keyword: non_blank_or(&header_keyword, default_header_keyword),
                reference_keyword: non_blank_or(&reference_keyword, default_reference_keyword),
                standalone_max,
                duplicates,
                preamble,
                orphan_min_length,
                subclauses,
                normalize_unicode,
                max_sibling_gap,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            header_keyword: config.header_keyword,
            reference_keyword: config.reference_keyword,
            standalone_max: config.standalone_max,
            duplicates: config.duplicates,
            preamble: config.preamble,
            orphan_min_length: config.orphan_min_length,
            subclauses: config.subclauses,
            normalize_unicode: config.normalize_unicode,
            max_sibling_gap: config.max_sibling_gap,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nheader_keyword = \"SECTION\"\nreference_keyword = \"section\"\nstandalone_max = 99\nduplicates = \"last-wins\"\npreamble = \"orphan\"\nsubclauses = true\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.header_keyword(), "SECTION");
        assert_eq!(config.reference_keyword(), "section");
        assert_eq!(config.standalone_max, 99);
        assert_eq!(config.duplicates, DuplicatePolicy::LastWins);
        assert_eq!(config.preamble, PreamblePolicy::Orphan);
        assert_eq!(config.orphan_min_length, 20);
        assert!(config.subclauses);
        assert!(config.normalize_unicode);
        assert_eq!(config.max_sibling_gap, 10);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(matches!(error, Error::Read(_)));
        assert!(error.to_string().starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nstandalone_max = \"fifty\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.to_string().starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn blank_keyword_falls_back_to_default() {
        let config: Config = toml::from_str("_version = \"1\"\nheader_keyword = \"  \"\n").unwrap();
        assert_eq!(config.header_keyword(), "TOPIC");

        let mut config = Config::default();
        config.set_reference_keyword("");
        assert_eq!(config.reference_keyword(), "topic");
        config.set_reference_keyword(" clause ");
        assert_eq!(config.reference_keyword(), "clause");
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("topicmap.toml");

        let mut config = Config::default();
        config.set_header_keyword("CLAUSE");
        config.duplicates = DuplicatePolicy::LastWins;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
