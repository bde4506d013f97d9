//! Coverage reporting: matching every labeled item and enforcing the
//! pass/fail policy.
//!
//! [`CoverageReporter::align`] resolves each labeled material item to a
//! ground-truth key, writes the key to `metadata.gt_key`, and aggregates
//! per-sub-study counts. [`CoverageReporter::enforce`] then applies the global
//! missing-rate thresholds of [`CoveragePolicy`]:
//!
//! | Rate | Definition | Default limit |
//! |------|------------|---------------|
//! | vs items | `missing / labeled items` | 0.8 |
//! | vs keys | `missing / available keys` | 0.5 |
//!
//! Exceeding either limit is a hard failure. Under-coverage below the limits
//! is expected (not every item has an analyzed ground-truth entry) and is only
//! logged as a warning.

use super::keyset::{CandidateKeySets, GroundTruthKeySetBuilder};
use super::matcher::KeyMatcher;
use crate::config::{CoveragePolicy, MatcherConfig};
use crate::documents::{GroundTruth, MaterialFile};
use crate::error::AlignmentError;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Coverage counts for one sub-study.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubStudyCoverage {
    /// Size of the candidate key set used for this sub-study
    pub gt_keys_total: usize,
    /// Items carrying a non-empty label
    pub items_total: usize,
    pub matched: usize,
    pub missing: usize,
    /// Ids of unmatched labeled items, in document order
    pub missing_items: Vec<String>,
}

/// Global totals across all sub-studies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub items_with_labels: usize,
    pub matched: usize,
    pub total_missing: usize,
    pub keys_available: usize,
    /// `total_missing / items_with_labels`, when there were labeled items
    pub missing_rate_vs_items: Option<f64>,
    /// `total_missing / keys_available`, when keys were available
    pub missing_rate_vs_keys: Option<f64>,
    /// Number of matches per matcher tier
    pub matches_by_tier: BTreeMap<String, usize>,
}

/// A key resolved by more than one item of the same sub-study.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateAssignment {
    pub sub_study_id: String,
    pub gt_key: String,
    pub item_ids: Vec<String>,
}

/// Result of one alignment run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoverageReport {
    pub sub_studies: BTreeMap<String, SubStudyCoverage>,
    pub summary: CoverageSummary,
    pub duplicates: Vec<DuplicateAssignment>,
    /// Indices (into the aligned material slice) of files whose items changed
    #[serde(skip)]
    modified: Vec<usize>,
}

impl CoverageReport {
    /// Indices of material files modified by the run.
    pub fn modified_files(&self) -> &[usize] {
        &self.modified
    }
}

/// Drives matching across all material items.
///
/// # Example
///
/// ```
/// use humanbench_core::documents::{GroundTruth, MaterialFile, MaterialItem};
/// use humanbench_core::CoverageReporter;
///
/// let ground_truth: GroundTruth = serde_json::from_str(
///     r#"{"studies": [{"study_label": "Study 1",
///         "findings": [{"original_data_points": {"data": {"shy": {}}}}]}]}"#,
/// ).unwrap();
/// let mut materials = vec![MaterialFile::new(
///     "study_1_traits",
///     vec![MaterialItem::with_label("q1", Some("Shy"))],
/// )];
///
/// let reporter = CoverageReporter::default();
/// let report = reporter.align(&mut materials, &ground_truth);
/// assert_eq!(report.sub_studies["study_1_traits"].matched, 1);
/// assert_eq!(materials[0].items[0].gt_key(), Some("shy"));
/// assert!(reporter.enforce(&report).is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageReporter {
    matcher: KeyMatcher,
    policy: CoveragePolicy,
}

impl CoverageReporter {
    /// Creates a reporter with custom matcher thresholds and policy.
    pub fn new(matcher: MatcherConfig, policy: CoveragePolicy) -> Self {
        Self {
            matcher: KeyMatcher::new(matcher),
            policy,
        }
    }

    /// Policy applied by [`enforce`](Self::enforce).
    pub fn policy(&self) -> &CoveragePolicy {
        &self.policy
    }

    /// Matches every labeled item, writing `metadata.gt_key` in place.
    ///
    /// Unlabeled items are skipped. An unmatched labeled item loses any
    /// `gt_key` left over from an earlier run.
    #[instrument(skip_all, fields(files = materials.len()))]
    pub fn align(&self, materials: &mut [MaterialFile], ground_truth: &GroundTruth) -> CoverageReport {
        let sub_study_ids: BTreeSet<String> =
            materials.iter().map(|m| m.sub_study_id().to_string()).collect();
        let key_sets = GroundTruthKeySetBuilder.build(ground_truth, &sub_study_ids);

        let mut report = CoverageReport::default();
        // sub_study_id -> gt_key -> item ids
        let mut assignments: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();

        for (file_idx, material) in materials.iter_mut().enumerate() {
            let changed =
                self.align_file(file_idx, material, &key_sets, &mut report, &mut assignments);
            if changed {
                report.modified.push(file_idx);
            }
        }

        for (sub_study_id, coverage) in &report.sub_studies {
            info!(
                sub_study = %sub_study_id,
                keys = coverage.gt_keys_total,
                items = coverage.items_total,
                matched = coverage.matched,
                missing = coverage.missing,
                fallback = key_sets.uses_fallback(sub_study_id),
                "sub-study coverage"
            );
        }

        report.duplicates = collect_duplicates(assignments);
        for dup in &report.duplicates {
            warn!(
                sub_study = %dup.sub_study_id,
                gt_key = %dup.gt_key,
                items = ?dup.item_ids,
                "ground-truth key assigned to multiple items"
            );
        }

        let by_tier = std::mem::take(&mut report.summary.matches_by_tier);
        report.summary = summarize(&report.sub_studies);
        report.summary.matches_by_tier = by_tier;
        report
    }

    /// Applies the coverage policy to a finished report.
    ///
    /// Returns [`AlignmentError::CoverageFailure`] when either missing rate
    /// exceeds its limit; otherwise logs a warning for any under-coverage.
    pub fn enforce(&self, report: &CoverageReport) -> Result<(), AlignmentError> {
        let summary = &report.summary;
        if summary.total_missing == 0 || summary.keys_available == 0 {
            return Ok(());
        }

        let vs_items = summary.missing_rate_vs_items.unwrap_or(0.0);
        let vs_keys = summary.missing_rate_vs_keys.unwrap_or(0.0);

        if vs_items > self.policy.max_missing_rate_vs_items
            || vs_keys > self.policy.max_missing_rate_vs_keys
        {
            return Err(AlignmentError::CoverageFailure {
                total_missing: summary.total_missing,
                missing_rate_vs_items: vs_items,
                missing_rate_vs_keys: vs_keys,
            });
        }

        warn!(
            total_missing = summary.total_missing,
            missing_rate_vs_items = vs_items,
            missing_rate_vs_keys = vs_keys,
            "some labeled items have no ground-truth key"
        );
        Ok(())
    }

    /// [`align`](Self::align) followed by [`enforce`](Self::enforce).
    pub fn align_checked(
        &self,
        materials: &mut [MaterialFile],
        ground_truth: &GroundTruth,
    ) -> Result<CoverageReport, AlignmentError> {
        let report = self.align(materials, ground_truth);
        self.enforce(&report)?;
        Ok(report)
    }

    /// Loads every material file in `materials_dir`, aligns it, and writes
    /// modified files back in place unless `dry_run` is set.
    ///
    /// The policy is not applied; call [`enforce`](Self::enforce) on the
    /// returned report.
    #[instrument(skip_all, fields(dir = %materials_dir.display(), dry_run = dry_run))]
    pub fn align_dir(
        &self,
        ground_truth: &GroundTruth,
        materials_dir: &Path,
        dry_run: bool,
    ) -> Result<CoverageReport, AlignmentError> {
        let mut materials = MaterialFile::load_dir(materials_dir)?;
        let report = self.align(&mut materials, ground_truth);

        if dry_run {
            info!(modified = report.modified.len(), "dry run, not writing material files");
            return Ok(report);
        }

        for &idx in &report.modified {
            let material = &materials[idx];
            material.save()?;
            debug!(sub_study = %material.sub_study_id(), "wrote material file");
        }
        Ok(report)
    }

    /// Matches the items of one file. Returns `true` when any item changed.
    fn align_file(
        &self,
        file_idx: usize,
        material: &mut MaterialFile,
        key_sets: &CandidateKeySets,
        report: &mut CoverageReport,
        assignments: &mut BTreeMap<String, BTreeMap<String, Vec<String>>>,
    ) -> bool {
        let sub_study_id = material.sub_study_id().to_string();
        let id_prefix = file_label(file_idx, material);
        let candidates = key_sets.candidates_for(&sub_study_id);

        let coverage = report.sub_studies.entry(sub_study_id.clone()).or_default();
        coverage.gt_keys_total = candidates.len();

        let mut changed = false;
        for (item_idx, item) in material.items.iter_mut().enumerate() {
            let Some(label) = item.label().map(str::to_string) else {
                continue;
            };
            let item_id = item
                .id()
                .unwrap_or_else(|| format!("{}#{}", id_prefix, item_idx));
            coverage.items_total += 1;

            match self.matcher.match_detailed(&label, candidates) {
                Some(outcome) => {
                    debug!(item = %item_id, label = %label, gt_key = outcome.key, tier = outcome.tier.name(), "matched");
                    changed |= item.set_gt_key(outcome.key);
                    coverage.matched += 1;
                    *report
                        .summary
                        .matches_by_tier
                        .entry(outcome.tier.name().to_string())
                        .or_default() += 1;
                    assignments
                        .entry(sub_study_id.clone())
                        .or_default()
                        .entry(outcome.key.to_string())
                        .or_default()
                        .push(item_id);
                }
                None => {
                    debug!(item = %item_id, label = %label, "no ground-truth key");
                    changed |= item.clear_gt_key();
                    coverage.missing += 1;
                    coverage.missing_items.push(item_id);
                }
            }
        }
        changed
    }
}

/// Prefix for items without an id: the file stem, or `file<N>` in memory.
fn file_label(file_idx: usize, material: &MaterialFile) -> String {
    material
        .path
        .as_deref()
        .and_then(|path| path.file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("file{}", file_idx))
}

fn summarize(sub_studies: &BTreeMap<String, SubStudyCoverage>) -> CoverageSummary {
    let items_with_labels = sub_studies
        .values()
        .filter(|c| c.items_total > 0)
        .map(|c| c.items_total)
        .sum();
    let keys_available = sub_studies
        .values()
        .filter(|c| c.gt_keys_total > 0)
        .map(|c| c.gt_keys_total)
        .sum();
    let matched = sub_studies.values().map(|c| c.matched).sum();
    let total_missing = sub_studies.values().map(|c| c.missing).sum();

    let rate = |denominator: usize| {
        (denominator > 0).then(|| total_missing as f64 / denominator as f64)
    };

    CoverageSummary {
        items_with_labels,
        matched,
        total_missing,
        keys_available,
        missing_rate_vs_items: rate(items_with_labels),
        missing_rate_vs_keys: rate(keys_available),
        matches_by_tier: BTreeMap::new(),
    }
}

fn collect_duplicates(
    assignments: BTreeMap<String, BTreeMap<String, Vec<String>>>,
) -> Vec<DuplicateAssignment> {
    assignments
        .into_iter()
        .flat_map(|(sub_study_id, keys)| {
            keys.into_iter()
                .filter(|(_, item_ids)| item_ids.len() > 1)
                .map(move |(gt_key, item_ids)| DuplicateAssignment {
                    sub_study_id: sub_study_id.clone(),
                    gt_key,
                    item_ids,
                })
        })
        .collect()
}
