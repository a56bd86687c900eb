//! End-to-end analysis of a single document.
//!
//! Stages run strictly in order: header detection, segmentation, preamble
//! handling, subclause extraction, reference detection, hierarchy building
//! and reference classification. Each call owns all of its intermediate
//! state, so separate documents can be analysed in parallel.

use std::path::Path;

use tracing::{info, instrument};

use crate::{
    audit::{self, Finding},
    domain::{
        Config, Hierarchy, PreamblePolicy, Reference, ReferenceIssue, TopicBlock,
        hierarchy::{Build, Options},
    },
    ingest,
    references::{ReferenceDetector, ReferenceGraph, classify},
    structure::{HeaderDetector, extract_subclauses, preamble, segment, segmenter},
};

/// Errors that can occur while analysing a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document could not be loaded.
    #[error(transparent)]
    Ingest(#[from] ingest::Error),

    /// Header positions violated the segmentation precondition.
    #[error("failed to segment document: {0}")]
    Segment(#[from] segmenter::Error),

    /// The reference marker word could not be turned into a pattern.
    #[error("invalid reference marker: {0}")]
    Marker(#[from] regex::Error),
}

/// The result of analysing one document.
///
/// Everything here is read-only once returned.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The topic node table.
    pub hierarchy: Hierarchy,

    /// Every reference occurrence, in detection order.
    pub references: Vec<Reference>,

    /// References whose target is missing or a placeholder.
    pub issues: Vec<ReferenceIssue>,

    /// Text before the first header, when retained.
    pub preamble: Option<TopicBlock>,

    /// Blocks dropped because their topic ID was already taken.
    pub discarded: Vec<TopicBlock>,
}

impl Analysis {
    /// The reference graph, borrowing this analysis' references.
    #[must_use]
    pub fn graph(&self) -> ReferenceGraph<'_> {
        ReferenceGraph::new(&self.references)
    }

    /// All audit findings for the document.
    #[must_use]
    pub fn findings(&self) -> Vec<Finding> {
        let mut findings = audit::run(&self.hierarchy, &self.issues);
        findings.extend(audit::duplicates(&self.discarded));
        findings.extend(audit::cycles(&self.graph()));
        findings
    }
}

/// Analyses normalized text.
///
/// # Errors
///
/// Returns an error if the reference marker cannot be compiled. Header
/// detection always yields valid segmentation input, so segmentation errors
/// indicate a bug.
#[instrument(level = "debug", skip_all, fields(len = text.len()))]
pub fn analyze(text: &str, config: &Config) -> Result<Analysis, Error> {
    let headers = HeaderDetector::from_config(config).detect(text);
    let mut blocks = segment(text, &headers)?;

    let preamble = match config.preamble {
        PreamblePolicy::Drop => None,
        PreamblePolicy::Orphan => preamble(text, &headers, config.orphan_min_length),
    };

    if config.subclauses {
        for block in &mut blocks {
            block.subclauses = extract_subclauses(block);
        }
    }

    let references = ReferenceDetector::from_config(config)?.detect(&blocks);

    let Build {
        hierarchy,
        discarded,
    } = Hierarchy::build(blocks, Options::from(config));

    let issues = classify(&hierarchy, &references);

    info!(
        topics = hierarchy.len(),
        references = references.len(),
        issues = issues.len(),
        "analysed document"
    );

    Ok(Analysis {
        hierarchy,
        references,
        issues,
        preamble,
        discarded,
    })
}

/// Loads, normalizes and analyses a document on disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the analysis fails.
#[instrument(skip(config))]
pub fn analyze_file(path: &Path, config: &Config) -> Result<Analysis, Error> {
    let text = ingest::load_normalized(path, config)?;
    analyze(&text, config)
}
