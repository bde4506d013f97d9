//! Pre-computed effect sizes compared directly.
//!
//! ```text
//! SE_combined = √(se_agent² + se_human²)    (0.1 when both are absent or zero)
//! d           = |es_agent − es_human| / SE_combined
//! ```

use super::{
    finish, require_finite, require_non_negative, type_mismatch, StandardizedDistance,
    Standardizer, StatisticSample,
};
use crate::config::EFFECT_SIZE_FALLBACK_SE;
use crate::error::StandardizeError;
use serde_json::{json, Map};

/// Registry tag.
pub const TAG: &str = "effect_size";

const METHOD: &str = "Direct Effect Size";

/// Standardizer for `effect_size {es, se?}` samples.
#[derive(Debug, Clone, Copy)]
pub struct EffectSizeStandardizer {
    fallback_se: f64,
}

impl EffectSizeStandardizer {
    /// Uses `fallback_se` when neither side reports an uncertainty.
    pub fn with_fallback_se(fallback_se: f64) -> Self {
        Self { fallback_se }
    }
}

impl Default for EffectSizeStandardizer {
    fn default() -> Self {
        Self::with_fallback_se(EFFECT_SIZE_FALLBACK_SE)
    }
}

impl Standardizer for EffectSizeStandardizer {
    fn method(&self) -> &'static str {
        METHOD
    }

    fn compute(
        &self,
        agent: &StatisticSample,
        human: &StatisticSample,
    ) -> Result<StandardizedDistance, StandardizeError> {
        let (es_agent, se_agent) = effect_parts(agent, "agent")?;
        let (es_human, se_human) = effect_parts(human, "human")?;

        let mut se_combined = se_agent.hypot(se_human);
        if se_combined == 0.0 {
            se_combined = self.fallback_se;
        }

        let d = (es_agent - es_human).abs() / se_combined;

        let mut details = Map::new();
        details.insert("es_agent".into(), json!(es_agent));
        details.insert("es_human".into(), json!(es_human));
        details.insert("se_agent".into(), json!(se_agent));
        details.insert("se_human".into(), json!(se_human));
        details.insert("se_combined".into(), json!(se_combined));
        finish(METHOD, d, details)
    }
}

fn effect_parts(sample: &StatisticSample, side: &str) -> Result<(f64, f64), StandardizeError> {
    let StatisticSample::EffectSize { es, se } = *sample else {
        return Err(type_mismatch(TAG, sample));
    };
    let es = require_finite(es, &format!("es_{}", side))?;
    let se = require_non_negative(se.unwrap_or(0.0), &format!("se_{}", side))?;
    Ok((es, se))
}
