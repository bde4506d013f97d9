//! `hb align`: resolve study paths, align materials, apply the policy.

use crate::config::{self, StudyPaths};
use crate::AlignArgs;
use anyhow::{Context, Result};
use humanbench_core::{AlignmentError, CoverageReport, CoverageReporter, GroundTruth, MatcherConfig};
use tracing::info;

/// Everything the output layer needs about one alignment run.
#[derive(Debug)]
pub struct AlignRun {
    pub paths: StudyPaths,
    pub dry_run: bool,
    pub report: CoverageReport,
    /// Set when the coverage policy rejected the run
    pub policy_error: Option<AlignmentError>,
}

impl AlignRun {
    pub fn passed(&self) -> bool {
        self.policy_error.is_none()
    }
}

/// Runs alignment for the study described by `args`.
///
/// I/O and parse failures are returned as errors. A policy failure is not:
/// the report is still produced (and files still written) so it can be shown.
pub fn execute_align(args: &AlignArgs) -> Result<AlignRun> {
    let study_dir = config::study_dir(args.study_dir.as_ref())?;
    let paths = config::resolve_paths(
        &study_dir,
        args.ground_truth.as_ref(),
        args.materials_dir.as_ref(),
    )?;
    let policy = config::coverage_policy(args.max_missing_items, args.max_missing_keys)?;

    let ground_truth = GroundTruth::from_path(&paths.ground_truth).with_context(|| {
        format!("Failed to load ground truth: {}", paths.ground_truth.display())
    })?;
    info!(
        ground_truth = %paths.ground_truth.display(),
        studies = ground_truth.studies.len(),
        "loaded ground truth"
    );

    let reporter = CoverageReporter::new(MatcherConfig::default(), policy);
    let report = reporter
        .align_dir(&ground_truth, &paths.materials_dir, args.dry_run)
        .with_context(|| {
            format!(
                "Failed to align materials in {}",
                paths.materials_dir.display()
            )
        })?;
    let policy_error = reporter.enforce(&report).err();

    Ok(AlignRun {
        paths,
        dry_run: args.dry_run,
        report,
        policy_error,
    })
}
