//! Binary proportions via the Freeman-Tukey arcsine transform.
//!
//! `θ = asin(√p)` stabilizes the variance of a proportion so that its standard
//! error depends only on `n`: `SE = 1 / (2√n)`. The distance is the angle
//! difference in pooled-SE units:
//!
//! ```text
//! d = |θ_agent − θ_human| / √(SE_agent² + SE_human²)
//! ```

use super::{
    finish, require_finite, require_sample_size, type_mismatch, StandardizedDistance,
    Standardizer, StatisticSample,
};
use crate::error::StandardizeError;
use serde_json::{json, Map};

/// Registry tag.
pub const TAG: &str = "proportion";

const METHOD: &str = "Freeman-Tukey";

/// Standardizer for `proportion {p, n}` samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionStandardizer;

impl Standardizer for ProportionStandardizer {
    fn method(&self) -> &'static str {
        METHOD
    }

    fn compute(
        &self,
        agent: &StatisticSample,
        human: &StatisticSample,
    ) -> Result<StandardizedDistance, StandardizeError> {
        let (p_agent, n_agent) = proportion_parts(agent, "agent")?;
        let (p_human, n_human) = proportion_parts(human, "human")?;

        let theta_agent = p_agent.sqrt().asin();
        let theta_human = p_human.sqrt().asin();

        let se_agent = 1.0 / (2.0 * n_agent.sqrt());
        let se_human = 1.0 / (2.0 * n_human.sqrt());
        let se_pooled = se_agent.hypot(se_human);

        let d = (theta_agent - theta_human).abs() / se_pooled;

        let mut details = Map::new();
        details.insert("p_agent".into(), json!(p_agent));
        details.insert("p_human".into(), json!(p_human));
        details.insert("theta_agent".into(), json!(theta_agent));
        details.insert("theta_human".into(), json!(theta_human));
        details.insert("se_pooled".into(), json!(se_pooled));
        details.insert("n_agent".into(), json!(n_agent));
        details.insert("n_human".into(), json!(n_human));
        finish(METHOD, d, details)
    }
}

fn proportion_parts(sample: &StatisticSample, side: &str) -> Result<(f64, f64), StandardizeError> {
    let StatisticSample::Proportion { p, n } = *sample else {
        return Err(type_mismatch(TAG, sample));
    };
    let p = require_finite(p, &format!("p_{}", side))?;
    if !(0.0..=1.0).contains(&p) {
        return Err(StandardizeError::InvalidSample(format!(
            "p_{} must be within [0, 1], got {}",
            side, p
        )));
    }
    let n = require_sample_size(n, &format!("n_{}", side))?;
    Ok((p, n))
}
