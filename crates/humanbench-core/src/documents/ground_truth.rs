//! Ground-truth document model.
//!
//! # Data Format
//!
//! ```text
//! {
//!   "studies": [
//!     {
//!       "study_id": "study_1",
//!       "study_label": "Study 1",
//!       "findings": [
//!         {
//!           "finding_id": "F1",
//!           "original_data_points": {
//!             "data": { "shy": { "mean": 3.2, "sd": 1.1, "n": 40 } }
//!           }
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Every key of every `data` map is a candidate ground-truth key. The summary
//! records themselves are not interpreted here.

use super::read_document;
use crate::error::AlignmentError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;

/// Canonical identifier of one human-study data point.
pub type GroundTruthKey = String;

/// Parsed ground-truth document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundTruth {
    #[serde(default)]
    pub studies: Vec<GroundTruthStudy>,
}

/// One study from a paper, with its statistically analyzed findings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundTruthStudy {
    #[serde(default)]
    pub study_id: Option<String>,
    /// Label as printed in the paper (e.g. "Study 2" or "Hometown survey")
    #[serde(default, alias = "label")]
    pub study_label: Option<String>,
    #[serde(default)]
    pub findings: Vec<Finding>,
}

/// A finding and the raw data points it was computed from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default)]
    pub finding_id: Option<String>,
    #[serde(default)]
    pub original_data_points: Option<OriginalDataPoints>,
}

/// Mapping from item/condition name to its numeric summary record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OriginalDataPoints {
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

impl GroundTruth {
    /// Loads a ground-truth document from disk.
    pub fn from_path(path: &Path) -> Result<Self, AlignmentError> {
        let contents = read_document(path)?;
        serde_json::from_str(&contents).map_err(|e| AlignmentError::DocumentParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Union of all study keys, in document order, first occurrence kept.
    pub fn all_keys(&self) -> Vec<GroundTruthKey> {
        let mut seen = HashSet::new();
        self.studies
            .iter()
            .flat_map(|study| study.keys())
            .filter(|key| seen.insert(key.clone()))
            .collect()
    }
}

impl GroundTruthStudy {
    /// Label used for sub-study attribution, falling back to the study id.
    pub fn label(&self) -> &str {
        self.study_label
            .as_deref()
            .or(self.study_id.as_deref())
            .unwrap_or("")
    }

    /// All data-point keys across this study's findings, de-duplicated.
    pub fn keys(&self) -> Vec<GroundTruthKey> {
        let mut seen = HashSet::new();
        self.findings
            .iter()
            .filter_map(|finding| finding.original_data_points.as_ref())
            .filter_map(|points| points.data.as_ref())
            .flat_map(|data| data.keys())
            .filter(|&key| seen.insert(key.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GroundTruth {
        serde_json::from_value(serde_json::json!({
            "studies": [
                {
                    "study_id": "s1",
                    "study_label": "Study 1",
                    "findings": [
                        {"original_data_points": {"data": {"shy": {"n": 10}, "outgoing": {"n": 10}}}},
                        {"original_data_points": {"data": {"shy": {"n": 12}, "calm": {}}}}
                    ]
                },
                {
                    "study_id": "s2",
                    "findings": [
                        {"original_data_points": {"data": {"calm": {}, "tense": {}}}},
                        {"original_data_points": null},
                        {}
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_study_keys_preserve_order_and_dedup() {
        let gt = sample();
        assert_eq!(gt.studies[0].keys(), vec!["shy", "outgoing", "calm"]);
        assert_eq!(gt.studies[1].keys(), vec!["calm", "tense"]);
    }

    #[test]
    fn test_all_keys_union() {
        let gt = sample();
        assert_eq!(gt.all_keys(), vec!["shy", "outgoing", "calm", "tense"]);
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let gt = sample();
        assert_eq!(gt.studies[0].label(), "Study 1");
        assert_eq!(gt.studies[1].label(), "s2");
        assert_eq!(GroundTruthStudy::default().label(), "");
    }

    #[test]
    fn test_missing_studies_defaults_empty() {
        let gt: GroundTruth = serde_json::from_str("{}").unwrap();
        assert!(gt.studies.is_empty());
        assert!(gt.all_keys().is_empty());
    }
}
