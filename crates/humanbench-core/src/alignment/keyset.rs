//! Grouping ground-truth keys by material sub-study.
//!
//! Papers label studies as "Study 2" or "Hometown survey" while material
//! generators name sub-studies `study_2_hometown`. This module attributes each
//! study's keys to sub-study ids with two heuristics, tried in order:
//!
//! 1. **Study number**: a trailing integer `N` in the label selects ids
//!    containing `study_N` not followed by another digit
//! 2. **Label words**: words longer than 4 characters select ids containing
//!    any of them
//!
//! Sub-studies that receive no keys fall back to the union of all keys. The
//! grouping is a best-effort classifier: a broad fallback set makes tiers 3-4
//! of the matcher more permissive, which shows up in the coverage report.

use crate::config::STUDY_WORD_MIN_LEN;
use crate::documents::ground_truth::{GroundTruth, GroundTruthKey};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, instrument};

static TRAILING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*$").expect("Invalid study number regex pattern"));

/// Candidate keys per sub-study, plus the global fallback.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CandidateKeySets {
    /// Keys explicitly attributed to a sub-study
    pub by_sub_study: BTreeMap<String, Vec<GroundTruthKey>>,
    /// Union of all keys across all studies
    pub global: Vec<GroundTruthKey>,
}

impl CandidateKeySets {
    /// Keys to match items of `sub_study_id` against.
    ///
    /// Falls back to the global set when nothing was attributed.
    pub fn candidates_for(&self, sub_study_id: &str) -> &[GroundTruthKey] {
        match self.by_sub_study.get(sub_study_id) {
            Some(keys) if !keys.is_empty() => keys,
            _ => &self.global,
        }
    }

    /// Whether `sub_study_id` uses the global fallback.
    pub fn uses_fallback(&self, sub_study_id: &str) -> bool {
        self.by_sub_study
            .get(sub_study_id)
            .map_or(true, |keys| keys.is_empty())
    }
}

/// Builds [`CandidateKeySets`] from a ground-truth document.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundTruthKeySetBuilder;

impl GroundTruthKeySetBuilder {
    /// Attributes every study's keys to the given material sub-study ids.
    #[instrument(skip_all, fields(studies = ground_truth.studies.len(), sub_studies = sub_study_ids.len()))]
    pub fn build(
        &self,
        ground_truth: &GroundTruth,
        sub_study_ids: &BTreeSet<String>,
    ) -> CandidateKeySets {
        let mut by_sub_study: BTreeMap<String, Vec<GroundTruthKey>> = BTreeMap::new();

        for study in &ground_truth.studies {
            let study_keys = study.keys();
            let label = study.label();
            let targets = match_sub_studies(label, sub_study_ids);

            if targets.is_empty() {
                debug!(label, keys = study_keys.len(), "study not attributed to any sub-study");
                continue;
            }
            debug!(label, ?targets, keys = study_keys.len(), "attributed study keys");

            for target in targets {
                let keys = by_sub_study.entry(target.to_string()).or_default();
                extend_unique(keys, &study_keys);
            }
        }

        CandidateKeySets {
            by_sub_study,
            global: ground_truth.all_keys(),
        }
    }
}

/// Sub-study ids selected by the first heuristic that yields a hit.
fn match_sub_studies<'a>(label: &str, sub_study_ids: &'a BTreeSet<String>) -> Vec<&'a str> {
    let by_number = match_by_study_number(label, sub_study_ids);
    if !by_number.is_empty() {
        return by_number;
    }
    match_by_label_words(label, sub_study_ids)
}

fn match_by_study_number<'a>(label: &str, sub_study_ids: &'a BTreeSet<String>) -> Vec<&'a str> {
    let Some(number) = TRAILING_NUMBER
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return Vec::new();
    };

    let needle = format!("study_{}", number);
    sub_study_ids
        .iter()
        .filter(|id| contains_study_number(&id.to_lowercase(), &needle))
        .map(String::as_str)
        .collect()
}

/// Whether `id` contains `needle` not followed by another digit, so
/// `study_1` finds `study_1_x` and `study_1-x` but not `study_10_x`.
fn contains_study_number(id: &str, needle: &str) -> bool {
    id.match_indices(needle).any(|(start, _)| {
        !id[start + needle.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}

fn match_by_label_words<'a>(label: &str, sub_study_ids: &'a BTreeSet<String>) -> Vec<&'a str> {
    let lowered = label.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > STUDY_WORD_MIN_LEN)
        .collect();
    if words.is_empty() {
        return Vec::new();
    }

    sub_study_ids
        .iter()
        .filter(|id| {
            let id = id.to_lowercase();
            words.iter().any(|word| id.contains(word))
        })
        .map(String::as_str)
        .collect()
}

fn extend_unique(keys: &mut Vec<GroundTruthKey>, additions: &[GroundTruthKey]) {
    let mut seen: HashSet<GroundTruthKey> = keys.iter().cloned().collect();
    for key in additions {
        if seen.insert(key.clone()) {
            keys.push(key.clone());
        }
    }
}
