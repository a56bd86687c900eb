//! Topic maps for plain-text documents.
//!
//! Numbered headers (`TOPIC 2.1: Definitions`, `2.1 Definitions`, `2.1`) are
//! turned into a hierarchy of topics, and inline mentions (`see Topic 4.2`)
//! into a directed graph of references. References whose targets are missing
//! or only placeholders are reported as structural issues.
//!
//! ```
//! use topicmap::{Config, analyze};
//!
//! let text = "TOPIC 1: Scope\nSee Topic 1 for context.\n2.1 Definitions\nAs defined in Topic 1.";
//! let analysis = analyze(text, &Config::default()).unwrap();
//!
//! assert!(!analysis.hierarchy.get("2.1").unwrap().synthetic);
//! assert!(analysis.hierarchy.get("2").unwrap().synthetic);
//! assert_eq!(analysis.references.len(), 2);
//! assert!(analysis.issues.is_empty());
//! ```

pub mod domain;
pub use domain::{
    Config, Hierarchy, IssueKind, Reference, ReferenceIssue, RegionKind, TopicBlock, TopicId,
    TopicNode,
};

pub mod structure;

pub mod references;
pub use references::ReferenceGraph;

/// Document loading and normalization.
pub mod ingest;

pub mod audit;
pub use audit::{Finding, Severity};

pub mod pipeline;
pub use pipeline::{Analysis, analyze, analyze_file};
