//! Inline references between topics: detection and graph building.

pub mod detector;
pub use detector::ReferenceDetector;

pub mod graph;
pub use graph::{ReferenceGraph, build_reference_graph, classify};
