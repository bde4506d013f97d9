//! Output formatting for alignment reports and standardization results.
//!
//! Supports both human-readable terminal output and JSON for scripting.

use crate::align::AlignRun;
use crate::standardize::ComparisonResult;
use humanbench_core::standardize::interpret_distance;
use humanbench_core::CoverageReport;
use serde::Serialize;
use serde_json::{Map, Value};

/// Maximum missing item ids listed per sub-study in human output
const MISSING_IDS_MAX: usize = 10;

/// JSON output structure for an alignment run
#[derive(Serialize)]
pub struct JsonAlignOutput<'a> {
    pub ground_truth: String,
    pub materials_dir: String,
    pub dry_run: bool,
    /// Files written (or that would be written on a dry run)
    pub files_modified: usize,
    pub passed: bool,
    pub error: Option<String>,
    pub report: &'a CoverageReport,
}

/// JSON output for one standardized comparison
#[derive(Serialize)]
pub struct JsonComparison<'a> {
    pub comparison_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> From<&'a ComparisonResult> for JsonComparison<'a> {
    fn from(comparison: &'a ComparisonResult) -> Self {
        match &comparison.result {
            Ok(distance) => Self {
                comparison_id: &comparison.comparison_id,
                d: Some(distance.d),
                magnitude: Some(distance.magnitude()),
                details: Some(&distance.details),
                error: None,
            },
            Err(e) => Self {
                comparison_id: &comparison.comparison_id,
                d: None,
                magnitude: None,
                details: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Formats an alignment run as JSON.
pub fn format_align_json(run: &AlignRun) -> String {
    let output = JsonAlignOutput {
        ground_truth: run.paths.ground_truth.display().to_string(),
        materials_dir: run.paths.materials_dir.display().to_string(),
        dry_run: run.dry_run,
        files_modified: run.report.modified_files().len(),
        passed: run.passed(),
        error: run.policy_error.as_ref().map(|e| e.to_string()),
        report: &run.report,
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Formats an alignment run for human-readable terminal output.
pub fn format_align_human(run: &AlignRun) -> String {
    let report = &run.report;
    let summary = &report.summary;

    if report.sub_studies.is_empty() {
        return format!(
            "No material files found in {}",
            run.paths.materials_dir.display()
        );
    }

    let mut output = String::new();
    output.push_str(&format!(
        "Aligned {} sub-stud{}: {} labeled item{}, {} matched, {} missing\n\n",
        report.sub_studies.len(),
        if report.sub_studies.len() == 1 { "y" } else { "ies" },
        summary.items_with_labels,
        plural(summary.items_with_labels),
        summary.matched,
        summary.total_missing
    ));

    for (sub_study_id, coverage) in &report.sub_studies {
        output.push_str(&format!(
            "  {}: {}/{} matched ({} candidate key{})\n",
            sub_study_id,
            coverage.matched,
            coverage.items_total,
            coverage.gt_keys_total,
            plural(coverage.gt_keys_total)
        ));
        if !coverage.missing_items.is_empty() {
            output.push_str(&format!(
                "     missing: {}\n",
                truncate_list(&coverage.missing_items, MISSING_IDS_MAX)
            ));
        }
    }

    if !summary.matches_by_tier.is_empty() {
        let tiers: Vec<String> = summary
            .matches_by_tier
            .iter()
            .map(|(tier, count)| format!("{}: {}", tier, count))
            .collect();
        output.push_str(&format!("\nMatches by tier: {}\n", tiers.join(", ")));
    }

    if !report.duplicates.is_empty() {
        output.push_str("\nKeys assigned to multiple items:\n");
        for dup in &report.duplicates {
            output.push_str(&format!(
                "  {}: \"{}\" <- {}\n",
                dup.sub_study_id,
                dup.gt_key,
                dup.item_ids.join(", ")
            ));
        }
    }

    output.push_str(&format!(
        "\nMissing rate: {} of labeled items, {} of available keys ({} keys)\n",
        percent(summary.missing_rate_vs_items),
        percent(summary.missing_rate_vs_keys),
        summary.keys_available
    ));

    let modified = report.modified_files().len();
    if run.dry_run {
        output.push_str(&format!(
            "Dry run: {} material file{} would be updated\n",
            modified,
            plural(modified)
        ));
    } else {
        output.push_str(&format!(
            "Updated {} material file{}\n",
            modified,
            plural(modified)
        ));
    }

    match &run.policy_error {
        Some(e) => output.push_str(&format!("FAILED: {}", e)),
        None => output.push_str("Coverage check passed"),
    }
    output
}

/// Formats standardization results as JSON.
pub fn format_standardize_json(results: &[ComparisonResult]) -> String {
    let output: Vec<JsonComparison> = results.iter().map(JsonComparison::from).collect();
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string())
}

/// Formats standardization results for human-readable terminal output.
pub fn format_standardize_human(results: &[ComparisonResult]) -> String {
    if results.is_empty() {
        return "No comparisons found".to_string();
    }

    let mut output = String::new();
    for comparison in results {
        match &comparison.result {
            Ok(distance) => {
                output.push_str(&format!(
                    "{}: d = {:.3} ({}, {})\n",
                    comparison.comparison_id,
                    distance.d,
                    interpret_distance(distance.d),
                    distance.method().unwrap_or("unknown method")
                ));
            }
            Err(e) => {
                output.push_str(&format!("{}: error: {}\n", comparison.comparison_id, e));
            }
        }
    }

    let failed = results.iter().filter(|c| c.result.is_err()).count();
    output.push_str(&format!(
        "\n{} comparison{}, {} failed",
        results.len(),
        plural(results.len()),
        failed
    ));
    output
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn percent(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Joins up to `max` entries, noting how many were left out.
fn truncate_list(entries: &[String], max: usize) -> String {
    if entries.len() <= max {
        entries.join(", ")
    } else {
        format!(
            "{} (+{} more)",
            entries[..max].join(", "),
            entries.len() - max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StudyPaths;
    use humanbench_core::documents::{GroundTruth, MaterialFile, MaterialItem};
    use humanbench_core::{CoverageReporter, StandardizeError, StandardizerRegistry, StatisticSample};
    use std::path::PathBuf;

    fn make_run(labels: &[&str], dry_run: bool) -> AlignRun {
        let ground_truth: GroundTruth = serde_json::from_str(
            r#"{"studies": [{"study_label": "Study 1",
                "findings": [{"original_data_points": {"data": {"shy": {}, "calm": {}}}}]}]}"#,
        )
        .unwrap();
        let items = labels
            .iter()
            .enumerate()
            .map(|(i, label)| MaterialItem::with_label(format!("q{}", i + 1), Some(label)))
            .collect();
        let mut materials = vec![MaterialFile::new("study_1_traits", items)];

        let reporter = CoverageReporter::default();
        let report = reporter.align(&mut materials, &ground_truth);
        let policy_error = reporter.enforce(&report).err();
        AlignRun {
            paths: StudyPaths {
                ground_truth: PathBuf::from("/study/ground_truth.json"),
                materials_dir: PathBuf::from("/study/materials"),
            },
            dry_run,
            report,
            policy_error,
        }
    }

    fn make_results() -> Vec<ComparisonResult> {
        let registry = StandardizerRegistry::with_builtins();
        vec![
            ComparisonResult {
                comparison_id: "F1".to_string(),
                result: registry.standardize(
                    &StatisticSample::Proportion { p: 0.5, n: 100.0 },
                    &StatisticSample::Proportion { p: 0.6, n: 100.0 },
                ),
            },
            ComparisonResult {
                comparison_id: "F2".to_string(),
                result: Err(StandardizeError::InvalidSample("n must be positive".to_string())),
            },
        ]
    }

    #[test]
    fn test_format_align_human_passed() {
        let output = format_align_human(&make_run(&["shy", "Calm"], false));
        assert!(output.contains("Aligned 1 sub-study"));
        assert!(output.contains("study_1_traits: 2/2 matched (2 candidate keys)"));
        assert!(output.contains("exact: 1"));
        assert!(output.contains("normalized_exact: 1"));
        assert!(output.contains("Updated 1 material file\n"));
        assert!(output.ends_with("Coverage check passed"));
    }

    #[test]
    fn test_format_align_human_failed() {
        let output = format_align_human(&make_run(&["shy", "zebra", "giraffe"], true));
        assert!(output.contains("missing: q2, q3"));
        assert!(output.contains("100.0% of available keys"));
        assert!(output.contains("Dry run: 1 material file would be updated"));
        assert!(output.contains("FAILED: Ground-truth coverage too low"));
    }

    #[test]
    fn test_format_align_human_duplicates() {
        let output = format_align_human(&make_run(&["shy", "SHY"], false));
        assert!(output.contains("study_1_traits: \"shy\" <- q1, q2"));
    }

    #[test]
    fn test_format_align_json() {
        let output = format_align_json(&make_run(&["shy", "zebra", "giraffe"], false));
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["passed"], false);
        assert_eq!(value["files_modified"], 1);
        assert_eq!(value["materials_dir"], "/study/materials");
        assert_eq!(value["report"]["summary"]["total_missing"], 2);
        assert_eq!(
            value["report"]["sub_studies"]["study_1_traits"]["missing_items"],
            serde_json::json!(["q2", "q3"])
        );
        assert!(value["error"].as_str().unwrap().contains("2 labeled items"));
    }

    #[test]
    fn test_format_standardize_human() {
        let output = format_standardize_human(&make_results());
        assert!(output.contains("F1: d = 1.424 (large, Freeman-Tukey)"));
        assert!(output.contains("F2: error: "));
        assert!(output.ends_with("2 comparisons, 1 failed"));
    }

    #[test]
    fn test_format_standardize_json() {
        let output = format_standardize_json(&make_results());
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["comparison_id"], "F1");
        assert_eq!(value[0]["magnitude"], "large");
        assert_eq!(value[0]["details"]["method"], "Freeman-Tukey");
        assert!(value[0].get("error").is_none());
        assert!(value[1].get("d").is_none());
        assert!(value[1]["error"].as_str().is_some());
    }

    #[test]
    fn test_truncate_list() {
        let ids: Vec<String> = (0..12).map(|i| format!("q{}", i)).collect();
        assert_eq!(truncate_list(&ids[..2], 10), "q0, q1");
        assert!(truncate_list(&ids, 10).ends_with("q9 (+2 more)"));
    }
}
