//! Document models for ground truth and generated materials.
//!
//! Both document kinds are JSON. Ground truth is read-only; material files are
//! rewritten in place after alignment, so their unknown fields and field order
//! are preserved (see [`MaterialItem`]).

pub mod ground_truth;
pub mod materials;

pub use ground_truth::{Finding, GroundTruth, GroundTruthStudy, OriginalDataPoints};
pub use materials::{MaterialFile, MaterialItem};

use crate::error::AlignmentError;
use std::path::Path;

/// Reads a file to a string, mapping failures to [`AlignmentError::DocumentRead`].
pub(crate) fn read_document(path: &Path) -> Result<String, AlignmentError> {
    std::fs::read_to_string(path).map_err(|e| AlignmentError::DocumentRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
