//! `hb standardize`: batch standardization of agent/human comparisons.
//!
//! Input is a JSON array:
//!
//! ```text
//! [
//!   {"comparison_id": "F1", "agent": {"type": "proportion", "p": 0.5, "n": 100},
//!                           "human": {"type": "proportion", "p": 0.6, "n": 100}}
//! ]
//! ```

use anyhow::{Context, Result};
use humanbench_core::{StandardizeError, StandardizedDistance, StandardizerRegistry, StatisticSample};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// One comparison as read from the input file.
///
/// Samples stay raw JSON until dispatch so an unknown type tag is reported
/// per comparison instead of failing the whole file.
#[derive(Debug, Deserialize)]
struct Comparison {
    #[serde(default)]
    comparison_id: Option<String>,
    agent: Value,
    human: Value,
}

/// Outcome of one comparison.
#[derive(Debug)]
pub struct ComparisonResult {
    pub comparison_id: String,
    pub result: Result<StandardizedDistance, StandardizeError>,
}

/// Reads `path` and standardizes every comparison in it.
pub fn execute_standardize(
    path: &Path,
    registry: &StandardizerRegistry,
) -> Result<Vec<ComparisonResult>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read comparisons: {}", path.display()))?;
    let comparisons: Vec<Comparison> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse comparisons: {}", path.display()))?;

    Ok(standardize_all(comparisons, registry))
}

fn standardize_all(
    comparisons: Vec<Comparison>,
    registry: &StandardizerRegistry,
) -> Vec<ComparisonResult> {
    comparisons
        .into_iter()
        .enumerate()
        .map(|(idx, comparison)| {
            let comparison_id = comparison
                .comparison_id
                .unwrap_or_else(|| format!("#{}", idx));
            let result = parse_sample(registry, "agent", comparison.agent).and_then(|agent| {
                let human = parse_sample(registry, "human", comparison.human)?;
                registry.standardize(&agent, &human)
            });

            match &result {
                Ok(distance) => debug!(comparison = %comparison_id, d = distance.d, "standardized"),
                Err(e) => warn!(comparison = %comparison_id, error = %e, "comparison failed"),
            }
            ComparisonResult {
                comparison_id,
                result,
            }
        })
        .collect()
}

fn parse_sample(
    registry: &StandardizerRegistry,
    role: &str,
    value: Value,
) -> Result<StatisticSample, StandardizeError> {
    let Some(tag) = value.get("type").and_then(Value::as_str) else {
        return Err(StandardizeError::InvalidSample(format!(
            "{} sample has no \"type\" field",
            role
        )));
    };
    registry.get(tag)?;

    serde_json::from_value(value)
        .map_err(|e| StandardizeError::InvalidSample(format!("{} sample: {}", role, e)))
}
