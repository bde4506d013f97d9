//! Ground-truth alignment.
//!
//! Resolves free-text material item labels to canonical ground-truth keys.
//!
//! # Pipeline
//!
//! ```text
//! GroundTruth ──► GroundTruthKeySetBuilder ──► CandidateKeySets
//!                                                   │
//! MaterialFile items ──► normalize ──► KeyMatcher ◄─┘
//!                                          │
//!                                          ▼
//!                              CoverageReporter ──► CoverageReport
//! ```
//!
//! - [`normalize`] - Label canonicalization
//! - [`matcher`] - Four-tier key matching
//! - [`keyset`] - Study-to-sub-study key attribution
//! - [`coverage`] - Per-sub-study counts and the pass/fail policy

pub mod coverage;
pub mod keyset;
pub mod matcher;
pub mod normalize;

pub use coverage::{
    CoverageReport, CoverageReporter, CoverageSummary, DuplicateAssignment, SubStudyCoverage,
};
pub use keyset::{CandidateKeySets, GroundTruthKeySetBuilder};
pub use matcher::{KeyMatcher, MatchOutcome, MatchTier};
pub use normalize::normalize;
