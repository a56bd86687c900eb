//! Document structure: header detection and segmentation into topic blocks.

pub mod header;
pub use header::{HeaderCandidate, HeaderDetector};

pub mod segmenter;
pub use segmenter::{extract_subclauses, preamble, segment};
