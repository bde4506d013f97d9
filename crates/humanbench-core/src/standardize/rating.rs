//! Continuous ratings via Cohen's d with a pooled standard deviation.
//!
//! ```text
//! SD_pooled = √(((n_a − 1)·SD_a² + (n_h − 1)·SD_h²) / (n_a + n_h − 2))
//! d         = |mean_a − mean_h| / SD_pooled
//! ```
//!
//! Inputs with `n_a + n_h ≤ 2` (empty pooled-variance denominator) or a zero
//! pooled SD are rejected rather than producing an undefined distance.

use super::{
    finish, require_finite, require_non_negative, require_sample_size, type_mismatch,
    StandardizedDistance, Standardizer, StatisticSample,
};
use crate::error::StandardizeError;
use serde_json::{json, Map};

/// Registry tag.
pub const TAG: &str = "rating";

const METHOD: &str = "Cohen's d";

/// Standardizer for `rating {mean, sd, n}` samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingStandardizer;

struct RatingParts {
    mean: f64,
    sd: f64,
    n: f64,
}

impl Standardizer for RatingStandardizer {
    fn method(&self) -> &'static str {
        METHOD
    }

    fn compute(
        &self,
        agent: &StatisticSample,
        human: &StatisticSample,
    ) -> Result<StandardizedDistance, StandardizeError> {
        let a = rating_parts(agent, "agent")?;
        let h = rating_parts(human, "human")?;

        let dof = a.n + h.n - 2.0;
        if dof <= 0.0 {
            return Err(StandardizeError::InvalidSample(format!(
                "n_agent + n_human must exceed 2 to pool variance, got {}",
                a.n + h.n
            )));
        }

        let pooled_var = ((a.n - 1.0) * a.sd.powi(2) + (h.n - 1.0) * h.sd.powi(2)) / dof;
        let sd_pooled = pooled_var.sqrt();
        if sd_pooled <= 0.0 || !sd_pooled.is_finite() {
            return Err(StandardizeError::InvalidSample(format!(
                "pooled standard deviation must be positive, got {}",
                sd_pooled
            )));
        }

        let d = (a.mean - h.mean).abs() / sd_pooled;

        let mut details = Map::new();
        details.insert("mean_agent".into(), json!(a.mean));
        details.insert("mean_human".into(), json!(h.mean));
        details.insert("sd_agent".into(), json!(a.sd));
        details.insert("sd_human".into(), json!(h.sd));
        details.insert("sd_pooled".into(), json!(sd_pooled));
        details.insert("n_agent".into(), json!(a.n));
        details.insert("n_human".into(), json!(h.n));
        finish(METHOD, d, details)
    }
}

fn rating_parts(sample: &StatisticSample, side: &str) -> Result<RatingParts, StandardizeError> {
    let StatisticSample::Rating { mean, sd, n } = *sample else {
        return Err(type_mismatch(TAG, sample));
    };
    Ok(RatingParts {
        mean: require_finite(mean, &format!("mean_{}", side))?,
        sd: require_non_negative(sd, &format!("sd_{}", side))?,
        n: require_sample_size(n, &format!("n_{}", side))?,
    })
}
