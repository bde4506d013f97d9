//! # Humanbench Core
//!
//! Ground-truth alignment and statistic standardization for comparing
//! simulated experimental data against published human baselines.
//!
//! ## Modules
//!
//! - [`alignment`] - Label normalization, key matching, sub-study key grouping
//!   and coverage reporting
//! - [`documents`] - Ground-truth and material document models
//! - [`standardize`] - Standardized distances for proportions, ratings and
//!   effect sizes, dispatched through a [`StandardizerRegistry`]
//! - [`config`] - Default thresholds shared by the CLI and the library
//! - [`error`] - Error types for alignment and standardization

pub mod alignment;
pub mod config;
pub mod documents;
pub mod error;
pub mod standardize;

pub use alignment::{
    normalize, CandidateKeySets, CoverageReport, CoverageReporter, GroundTruthKeySetBuilder,
    KeyMatcher, MatchTier, SubStudyCoverage,
};
pub use config::{CoveragePolicy, MatcherConfig};
pub use documents::{GroundTruth, MaterialFile};
pub use error::{AlignmentError, StandardizeError};
pub use standardize::{
    StandardizedDistance, Standardizer, StandardizerRegistry, StatisticSample,
};
