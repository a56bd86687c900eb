//! Domain models for topic mapping.
//!
//! This module contains the core types: topic identifiers, the blocks of text
//! they introduce, the references between them, the topic hierarchy, and
//! configuration.

/// Hierarchical topic identifiers and their ordering.
pub mod topic_id;
pub use topic_id::{Error as TopicIdError, TopicId};

mod block;
pub use block::{Subclause, TopicBlock};

/// Inline references between topics.
pub mod reference;
pub use reference::{IssueKind, Reference, ReferenceIssue, RegionKind};

/// The topic node table.
pub mod hierarchy;
pub use hierarchy::{Hierarchy, TopicNode};

/// Analysis settings and their file format.
pub mod config;
pub use config::{Config, DuplicatePolicy, PreamblePolicy};
