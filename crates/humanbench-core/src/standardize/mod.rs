//! Standardized distances between agent and human statistics.
//!
//! Three measurement types are converted into one unit-free distance `d`:
//!
//! | Type tag | Sample | Method | Unit |
//! |----------|--------|--------|------|
//! | `proportion` | `{p, n}` | Freeman-Tukey arcsine transform | pooled SE |
//! | `rating` | `{mean, sd, n}` | Cohen's d | pooled SD |
//! | `effect_size` | `{es, se?}` | Direct effect size difference | combined SE |
//!
//! Every result carries a `details` map with all formula inputs, the
//! intermediate values and the method name, so downstream reports can audit
//! and reproduce it.
//!
//! # Example
//!
//! ```
//! use humanbench_core::{StandardizerRegistry, StatisticSample};
//!
//! let registry = StandardizerRegistry::with_builtins();
//! let agent = StatisticSample::Proportion { p: 0.5, n: 100.0 };
//! let human = StatisticSample::Proportion { p: 0.6, n: 100.0 };
//!
//! let result = registry.standardize(&agent, &human).unwrap();
//! assert!((result.d - 1.424).abs() < 1e-3);
//! assert_eq!(result.method(), Some("Freeman-Tukey"));
//! ```
//!
//! # Interpretation (Cohen's conventions)
//!
//! - d < 0.2: negligible
//! - 0.2 <= d < 0.5: small
//! - 0.5 <= d < 0.8: medium
//! - d >= 0.8: large

pub mod effect_size;
pub mod proportion;
pub mod rating;
pub mod registry;

pub use effect_size::EffectSizeStandardizer;
pub use proportion::ProportionStandardizer;
pub use rating::RatingStandardizer;
pub use registry::StandardizerRegistry;

use crate::error::StandardizeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Details key holding the method name.
pub const METHOD_KEY: &str = "method";

/// A normalized statistic record, shaped by its type tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatisticSample {
    /// Binary outcome: proportion `p` of `n` respondents
    Proportion { p: f64, n: f64 },
    /// Continuous rating summarized by mean, standard deviation and `n`
    Rating { mean: f64, sd: f64, n: f64 },
    /// Pre-computed effect size with optional standard error
    EffectSize {
        es: f64,
        #[serde(default)]
        se: Option<f64>,
    },
}

impl StatisticSample {
    /// Registry tag for this sample's shape.
    pub fn type_tag(&self) -> &'static str {
        match self {
            StatisticSample::Proportion { .. } => proportion::TAG,
            StatisticSample::Rating { .. } => rating::TAG,
            StatisticSample::EffectSize { .. } => effect_size::TAG,
        }
    }
}

/// Distance `d ≥ 0` plus the audit trail used to compute it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardizedDistance {
    pub d: f64,
    pub details: Map<String, Value>,
}

impl StandardizedDistance {
    /// Method name recorded in `details`.
    pub fn method(&self) -> Option<&str> {
        self.details.get(METHOD_KEY)?.as_str()
    }

    /// Cohen-style magnitude bucket for `d`.
    pub fn magnitude(&self) -> &'static str {
        interpret_distance(self.d)
    }
}

/// Converts an agent/human sample pair into a standardized distance.
///
/// Implementations are stateless and shared across threads by the registry.
pub trait Standardizer: Send + Sync {
    /// Method name written to `details`.
    fn method(&self) -> &'static str;

    /// Computes `d` for one comparison.
    ///
    /// Must return either a finite, non-negative `d` or an error.
    fn compute(
        &self,
        agent: &StatisticSample,
        human: &StatisticSample,
    ) -> Result<StandardizedDistance, StandardizeError>;
}

/// Interprets a standardized distance.
pub fn interpret_distance(d: f64) -> &'static str {
    let d_abs = d.abs();
    if d_abs < 0.2 {
        "negligible"
    } else if d_abs < 0.5 {
        "small"
    } else if d_abs < 0.8 {
        "medium"
    } else {
        "large"
    }
}

// ============================================================================
// Shared validation
// ============================================================================

pub(crate) fn type_mismatch(expected: &str, found: &StatisticSample) -> StandardizeError {
    StandardizeError::TypeMismatch {
        expected: expected.to_string(),
        found: found.type_tag().to_string(),
    }
}

pub(crate) fn require_finite(value: f64, name: &str) -> Result<f64, StandardizeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StandardizeError::InvalidSample(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}

pub(crate) fn require_sample_size(n: f64, name: &str) -> Result<f64, StandardizeError> {
    require_finite(n, name)?;
    if n <= 0.0 {
        return Err(StandardizeError::InvalidSample(format!(
            "{} must be positive, got {}",
            name, n
        )));
    }
    Ok(n)
}

pub(crate) fn require_non_negative(value: f64, name: &str) -> Result<f64, StandardizeError> {
    require_finite(value, name)?;
    if value < 0.0 {
        return Err(StandardizeError::InvalidSample(format!(
            "{} must be non-negative, got {}",
            name, value
        )));
    }
    Ok(value)
}

/// Wraps `d` and its details, rejecting NaN and infinity.
pub(crate) fn finish(
    method: &'static str,
    d: f64,
    mut details: Map<String, Value>,
) -> Result<StandardizedDistance, StandardizeError> {
    if !d.is_finite() {
        return Err(StandardizeError::NonFiniteDistance(format!(
            "{} produced {}",
            method, d
        )));
    }
    details.insert(METHOD_KEY.to_string(), Value::from(method));
    Ok(StandardizedDistance { d, details })
}
