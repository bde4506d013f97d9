//! Path resolution and policy overrides for the CLI.
//!
//! A study directory holds the ground truth and the generated materials:
//!
//! ```text
//! <study_dir>/
//!   ground_truth.json
//!   materials/
//!     study_1_traits.json
//!     ...
//! ```
//!
//! The study directory is taken from `--study-dir`, then
//! `$HUMANBENCH_STUDY_DIR`, then the current directory. `--ground-truth` and
//! `--materials-dir` override the individual locations.

use anyhow::{anyhow, bail, Context, Result};
use humanbench_core::CoveragePolicy;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Ground-truth file name inside a study directory
const GROUND_TRUTH_FILENAME: &str = "ground_truth.json";

/// Materials directory name inside a study directory
const MATERIALS_DIRNAME: &str = "materials";

/// Environment variable for the default study directory
const STUDY_DIR_ENV: &str = "HUMANBENCH_STUDY_DIR";

/// Resolved input locations for one alignment run.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyPaths {
    pub ground_truth: PathBuf,
    pub materials_dir: PathBuf,
}

/// Returns the study directory.
///
/// Search order:
/// 1. `custom_dir` (the `--study-dir` flag)
/// 2. `$HUMANBENCH_STUDY_DIR` environment variable
/// 3. Current working directory
pub fn study_dir(custom_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Could not determine current directory")?;
    Ok(select_study_dir(
        custom_dir,
        std::env::var_os(STUDY_DIR_ENV),
        cwd,
    ))
}

fn select_study_dir(custom_dir: Option<&PathBuf>, env_dir: Option<OsString>, cwd: PathBuf) -> PathBuf {
    if let Some(dir) = custom_dir {
        return dir.clone();
    }
    match env_dir {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => cwd,
    }
}

/// Resolves the ground-truth file and materials directory.
///
/// Explicit overrides win over the study-directory layout. Both locations
/// must exist.
pub fn resolve_paths(
    study_dir: &Path,
    ground_truth: Option<&PathBuf>,
    materials_dir: Option<&PathBuf>,
) -> Result<StudyPaths> {
    let ground_truth = ground_truth
        .cloned()
        .unwrap_or_else(|| study_dir.join(GROUND_TRUTH_FILENAME));
    let materials_dir = materials_dir
        .cloned()
        .unwrap_or_else(|| study_dir.join(MATERIALS_DIRNAME));

    if !ground_truth.is_file() {
        return Err(anyhow!(
            "Ground truth not found: {}\n\
             Pass --ground-truth, --study-dir, or set ${}",
            ground_truth.display(),
            STUDY_DIR_ENV
        ));
    }
    if !materials_dir.is_dir() {
        return Err(anyhow!(
            "Materials directory not found: {}\n\
             Pass --materials-dir, --study-dir, or set ${}",
            materials_dir.display(),
            STUDY_DIR_ENV
        ));
    }

    Ok(StudyPaths {
        ground_truth,
        materials_dir,
    })
}

/// Builds the coverage policy, applying any flag overrides.
pub fn coverage_policy(
    max_missing_items: Option<f64>,
    max_missing_keys: Option<f64>,
) -> Result<CoveragePolicy> {
    let defaults = CoveragePolicy::default();
    Ok(CoveragePolicy {
        max_missing_rate_vs_items: validate_rate(
            "--max-missing-items",
            max_missing_items.unwrap_or(defaults.max_missing_rate_vs_items),
        )?,
        max_missing_rate_vs_keys: validate_rate(
            "--max-missing-keys",
            max_missing_keys.unwrap_or(defaults.max_missing_rate_vs_keys),
        )?,
    })
}

fn validate_rate(flag: &str, rate: f64) -> Result<f64> {
    if !rate.is_finite() || rate < 0.0 {
        bail!("{} must be a non-negative number, got {}", flag, rate);
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn study_layout() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(GROUND_TRUTH_FILENAME), r#"{"studies": []}"#).unwrap();
        std::fs::create_dir(dir.path().join(MATERIALS_DIRNAME)).unwrap();
        dir
    }

    #[test]
    fn test_custom_study_dir_wins() {
        let custom = PathBuf::from("/tmp/custom-study");
        let dir = select_study_dir(
            Some(&custom),
            Some(OsString::from("/tmp/env-study")),
            PathBuf::from("/cwd"),
        );
        assert_eq!(dir, custom);
    }

    #[test]
    fn test_env_study_dir_before_cwd() {
        let dir = select_study_dir(None, Some(OsString::from("/tmp/env-study")), PathBuf::from("/cwd"));
        assert_eq!(dir, PathBuf::from("/tmp/env-study"));
    }

    #[test]
    fn test_empty_env_falls_back_to_cwd() {
        let dir = select_study_dir(None, Some(OsString::new()), PathBuf::from("/cwd"));
        assert_eq!(dir, PathBuf::from("/cwd"));
        assert_eq!(select_study_dir(None, None, PathBuf::from("/cwd")), PathBuf::from("/cwd"));
    }

    #[test]
    fn test_resolve_default_layout() {
        let dir = study_layout();
        let paths = resolve_paths(dir.path(), None, None).unwrap();
        assert_eq!(paths.ground_truth, dir.path().join("ground_truth.json"));
        assert_eq!(paths.materials_dir, dir.path().join("materials"));
    }

    #[test]
    fn test_resolve_overrides() {
        let dir = study_layout();
        let other = TempDir::new().unwrap();
        let gt = other.path().join("gt.json");
        std::fs::write(&gt, "{}").unwrap();

        let paths = resolve_paths(Path::new("/nonexistent"), Some(&gt), Some(&dir.path().join("materials"))).unwrap();
        assert_eq!(paths.ground_truth, gt);
    }

    #[test]
    fn test_resolve_missing_ground_truth() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(MATERIALS_DIRNAME)).unwrap();
        let err = resolve_paths(dir.path(), None, None).unwrap_err();
        assert!(err.to_string().contains("Ground truth not found"));
    }

    #[test]
    fn test_resolve_missing_materials() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(GROUND_TRUTH_FILENAME), "{}").unwrap();
        let err = resolve_paths(dir.path(), None, None).unwrap_err();
        assert!(err.to_string().contains("Materials directory not found"));
    }

    #[test]
    fn test_coverage_policy_overrides() {
        let policy = coverage_policy(None, None).unwrap();
        assert_eq!(policy, CoveragePolicy::default());

        let policy = coverage_policy(Some(0.5), Some(2.0)).unwrap();
        assert_eq!(policy.max_missing_rate_vs_items, 0.5);
        assert_eq!(policy.max_missing_rate_vs_keys, 2.0);

        assert!(coverage_policy(Some(-0.1), None).is_err());
        assert!(coverage_policy(None, Some(f64::NAN)).is_err());
    }
}
