//! Default thresholds for matching, coverage and standardization.
//!
//! These constants are the production defaults. [`MatcherConfig`] and
//! [`CoveragePolicy`] start from them and can be overridden by the CLI.
//!
//! # Usage
//!
//! ```
//! use humanbench_core::config::{CoveragePolicy, MAX_MISSING_RATE_VS_ITEMS};
//!
//! let policy = CoveragePolicy::default();
//! assert_eq!(policy.max_missing_rate_vs_items, MAX_MISSING_RATE_VS_ITEMS);
//! ```

use serde::{Deserialize, Serialize};

// =============================================================================
// Key Matching
// =============================================================================

/// Minimum token Jaccard similarity (exclusive) for a tier-3 match.
pub const JACCARD_THRESHOLD: f64 = 0.7;

/// Label tokens must be longer than this many characters to count as
/// significant words in the keyword-overlap tier.
pub const SIGNIFICANT_WORD_MIN_LEN: usize = 3;

/// Number of significant words a candidate must share for a tier-4 match.
pub const KEYWORD_MIN_OVERLAP: usize = 2;

// =============================================================================
// Sub-Study Grouping
// =============================================================================

/// Study label words must be longer than this to be used for substring
/// matching against sub-study ids.
pub const STUDY_WORD_MIN_LEN: usize = 4;

// =============================================================================
// Coverage Policy
// =============================================================================

/// Hard failure when more than this fraction of labeled items is unmatched.
pub const MAX_MISSING_RATE_VS_ITEMS: f64 = 0.8;

/// Hard failure when unmatched items exceed this fraction of available keys.
pub const MAX_MISSING_RATE_VS_KEYS: f64 = 0.5;

// =============================================================================
// Standardization
// =============================================================================

/// Combined standard error assumed for effect sizes reported without any
/// uncertainty (a "typical" 10% relative SE).
pub const EFFECT_SIZE_FALLBACK_SE: f64 = 0.1;

/// Thresholds used by [`KeyMatcher`](crate::alignment::KeyMatcher).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Tier 3 succeeds only when the best Jaccard score is strictly above this
    pub jaccard_threshold: f64,
    /// Tier 4 ignores label tokens with this many characters or fewer
    pub significant_word_min_len: usize,
    /// Tier 4 needs at least this many shared significant words
    pub keyword_min_overlap: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            jaccard_threshold: JACCARD_THRESHOLD,
            significant_word_min_len: SIGNIFICANT_WORD_MIN_LEN,
            keyword_min_overlap: KEYWORD_MIN_OVERLAP,
        }
    }
}

/// Pass/fail thresholds applied to the global missing rate after alignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoveragePolicy {
    /// Maximum tolerated `missing / labeled items`
    pub max_missing_rate_vs_items: f64,
    /// Maximum tolerated `missing / available keys`
    pub max_missing_rate_vs_keys: f64,
}

impl Default for CoveragePolicy {
    fn default() -> Self {
        Self {
            max_missing_rate_vs_items: MAX_MISSING_RATE_VS_ITEMS,
            max_missing_rate_vs_keys: MAX_MISSING_RATE_VS_KEYS,
        }
    }
}
