//! Error types for humanbench-core.
//!
//! Alignment errors cover document I/O and the coverage policy; standardization
//! errors cover registry lookups and sample validation.

use thiserror::Error;

/// Errors that can occur while aligning materials against ground truth.
#[derive(Debug, Clone, Error)]
pub enum AlignmentError {
    /// Too many labeled items could not be matched to a ground-truth key
    #[error(
        "Ground-truth coverage too low: {total_missing} labeled items unmatched \
         (missing rate vs items {items_pct:.1}%, vs keys {keys_pct:.1}%)",
        items_pct = .missing_rate_vs_items * 100.0,
        keys_pct = .missing_rate_vs_keys * 100.0
    )]
    CoverageFailure {
        /// Number of labeled items without a match
        total_missing: usize,
        /// `total_missing / items_with_labels`
        missing_rate_vs_items: f64,
        /// `total_missing / keys_available`
        missing_rate_vs_keys: f64,
    },
    /// Failed to read a document from disk
    #[error("Failed to read {path}: {reason}")]
    DocumentRead { path: String, reason: String },
    /// Document is not valid JSON or does not match the expected schema
    #[error("Failed to parse {path}: {reason}")]
    DocumentParse { path: String, reason: String },
    /// Failed to write a document back to disk
    #[error("Failed to write {path}: {reason}")]
    DocumentWrite { path: String, reason: String },
}

/// Errors that can occur while computing a standardized distance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StandardizeError {
    /// No standardizer registered under the requested tag
    #[error("Unknown statistic type '{tag}' (known types: {})", .known.join(", "))]
    UnknownType { tag: String, known: Vec<String> },
    /// Sample values are outside the domain of the formula
    #[error("Invalid sample: {0}")]
    InvalidSample(String),
    /// Samples do not share the type the standardizer expects
    #[error("Sample type mismatch: expected '{expected}', found '{found}'")]
    TypeMismatch { expected: String, found: String },
    /// Computation produced NaN or infinity
    #[error("Standardized distance is not finite: {0}")]
    NonFiniteDistance(String),
}

impl From<AlignmentError> for String {
    fn from(err: AlignmentError) -> String {
        err.to_string()
    }
}

impl From<StandardizeError> for String {
    fn from(err: StandardizeError) -> String {
        err.to_string()
    }
}
