//! End-to-end tests for alignment over material files on disk and for
//! standardization through the registry.
//!
//! Run with: `cargo test -p humanbench-core --test integration_tests`

use humanbench_core::documents::{GroundTruth, MaterialFile};
use humanbench_core::{
    AlignmentError, CoverageReporter, StandardizeError, StandardizerRegistry, StatisticSample,
};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// Fixtures
// ============================================================================

fn ground_truth() -> GroundTruth {
    serde_json::from_value(json!({
        "studies": [
            {
                "study_id": "s1",
                "study_label": "Study 1",
                "findings": [{
                    "finding_id": "F1",
                    "original_data_points": {
                        "data": {
                            "shy": {"mean": 3.1, "sd": 1.2, "n": 40},
                            "outgoing": {"mean": 4.4, "sd": 1.0, "n": 40}
                        }
                    }
                }]
            },
            {
                "study_id": "s2",
                "study_label": "Study 2",
                "findings": [{
                    "finding_id": "F2",
                    "original_data_points": {
                        "data": {
                            "Hometown > 200k": {"percentage": 41.0, "n": 120},
                            "Hometown < 50k": {"percentage": 22.0, "n": 120}
                        }
                    }
                }]
            }
        ]
    }))
    .unwrap()
}

fn write_json(dir: &Path, name: &str, value: &Value) {
    std::fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn read_json(dir: &Path, name: &str) -> Value {
    serde_json::from_str(&std::fs::read_to_string(dir.join(name)).unwrap()).unwrap()
}

fn materials_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_json(
        dir.path(),
        "study_1_traits.json",
        &json!({
            "sub_study_id": "study_1_traits",
            "instructions": "Rate how well each word describes you.",
            "items": [
                {"id": "q1", "text": "Shy", "metadata": {"label": "Shy (self-rated)"}},
                {"id": "q2", "text": "Outgoing", "metadata": {"label": "OUTGOING"}},
                {"id": "intro", "text": "Welcome"}
            ]
        }),
    );
    write_json(
        dir.path(),
        "study_2_hometown.json",
        &json!({
            "sub_study_id": "study_2_hometown",
            "items": [
                {"id": "h1", "metadata": {"label": "Hometown (population) more than 200k", "note": "grande ville, été"}},
                {"id": "h2", "metadata": {"label": "Hometown less than 50k - yes"}}
            ]
        }),
    );
    // Not a material file
    std::fs::write(dir.path().join("README.txt"), "ignored").unwrap();
    dir
}

// ============================================================================
// Alignment
// ============================================================================

#[test]
fn test_align_dir_writes_keys_in_place() {
    let dir = materials_dir();
    let reporter = CoverageReporter::default();

    let report = reporter
        .align_dir(&ground_truth(), dir.path(), false)
        .unwrap();
    reporter.enforce(&report).unwrap();

    assert_eq!(report.summary.items_with_labels, 4);
    assert_eq!(report.summary.matched, 4);
    assert_eq!(report.summary.total_missing, 0);
    assert_eq!(report.sub_studies["study_1_traits"].gt_keys_total, 2);
    assert_eq!(report.sub_studies["study_2_hometown"].gt_keys_total, 2);

    let traits = read_json(dir.path(), "study_1_traits.json");
    assert_eq!(traits["items"][0]["metadata"]["gt_key"], "shy");
    assert_eq!(traits["items"][1]["metadata"]["gt_key"], "outgoing");
    assert!(traits["items"][2].get("metadata").is_none());
    assert_eq!(
        traits["instructions"],
        "Rate how well each word describes you."
    );

    let hometown = read_json(dir.path(), "study_2_hometown.json");
    assert_eq!(hometown["items"][0]["metadata"]["gt_key"], "Hometown > 200k");
    assert_eq!(hometown["items"][1]["metadata"]["gt_key"], "Hometown < 50k");
}

#[test]
fn test_written_files_are_readable_utf8() {
    let dir = materials_dir();
    CoverageReporter::default()
        .align_dir(&ground_truth(), dir.path(), false)
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("study_2_hometown.json")).unwrap();
    assert!(raw.contains("grande ville, été"), "non-ASCII text must be kept verbatim");
    assert!(raw.contains("\n  \"items\""), "expected indented output");

    // Reloads through the typed model
    let reloaded = MaterialFile::load(&dir.path().join("study_2_hometown.json")).unwrap();
    assert_eq!(reloaded.items[0].gt_key(), Some("Hometown > 200k"));
}

#[test]
fn test_dry_run_leaves_files_untouched() {
    let dir = materials_dir();
    let before = std::fs::read_to_string(dir.path().join("study_1_traits.json")).unwrap();

    let report = CoverageReporter::default()
        .align_dir(&ground_truth(), dir.path(), true)
        .unwrap();
    assert_eq!(report.summary.matched, 4);
    assert_eq!(report.modified_files().len(), 2);

    let after = std::fs::read_to_string(dir.path().join("study_1_traits.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_coverage_failure_after_write_back() {
    let dir = TempDir::new().unwrap();
    let items: Vec<Value> = (0..10)
        .map(|i| {
            let label = if i == 0 {
                "shy".to_string()
            } else {
                format!("zebra{}", i)
            };
            json!({"id": format!("q{}", i), "metadata": {"label": label}})
        })
        .collect();
    write_json(
        dir.path(),
        "study_1_traits.json",
        &json!({"sub_study_id": "study_1_traits", "items": items}),
    );

    let reporter = CoverageReporter::default();
    let report = reporter
        .align_dir(&ground_truth(), dir.path(), false)
        .unwrap();
    let err = reporter.enforce(&report).unwrap_err();

    match err {
        AlignmentError::CoverageFailure { total_missing, .. } => assert_eq!(total_missing, 9),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(report.sub_studies["study_1_traits"].missing_items.len(), 9);

    // The matched item was still persisted
    let written = read_json(dir.path(), "study_1_traits.json");
    assert_eq!(written["items"][0]["metadata"]["gt_key"], "shy");
}

#[test]
fn test_unattributed_sub_study_uses_global_keys() {
    let dir = TempDir::new().unwrap();
    write_json(
        dir.path(),
        "pilot.json",
        &json!({
            "sub_study_id": "pilot_block",
            "items": [{"id": "p1", "metadata": {"label": "hometown > 200k"}}]
        }),
    );

    let report = CoverageReporter::default()
        .align_dir(&ground_truth(), dir.path(), false)
        .unwrap();
    assert_eq!(report.sub_studies["pilot_block"].gt_keys_total, 4);
    assert_eq!(report.sub_studies["pilot_block"].matched, 1);
}

#[test]
fn test_invalid_material_file_reports_path() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    let err = CoverageReporter::default()
        .align_dir(&ground_truth(), dir.path(), false)
        .unwrap_err();
    match err {
        AlignmentError::DocumentParse { path, .. } => assert!(path.ends_with("broken.json")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_ground_truth_from_path() {
    let dir = TempDir::new().unwrap();
    write_json(
        dir.path(),
        "ground_truth.json",
        &serde_json::to_value(ground_truth()).unwrap(),
    );
    let loaded = GroundTruth::from_path(&dir.path().join("ground_truth.json")).unwrap();
    assert_eq!(
        loaded.all_keys(),
        vec!["shy", "outgoing", "Hometown > 200k", "Hometown < 50k"]
    );
}

// ============================================================================
// Standardization
// ============================================================================

#[test]
fn test_registry_reference_values() {
    let registry = StandardizerRegistry::with_builtins();

    let proportion = registry
        .standardize(
            &StatisticSample::Proportion { p: 0.5, n: 100.0 },
            &StatisticSample::Proportion { p: 0.6, n: 100.0 },
        )
        .unwrap();
    assert!((proportion.d - 1.424).abs() < 1e-3);

    let rating = registry
        .standardize(
            &StatisticSample::Rating {
                mean: 50.0,
                sd: 10.0,
                n: 30.0,
            },
            &StatisticSample::Rating {
                mean: 45.0,
                sd: 12.0,
                n: 30.0,
            },
        )
        .unwrap();
    assert!((rating.d - 0.452).abs() < 1e-3);

    let effect = registry
        .standardize(
            &StatisticSample::EffectSize { es: 0.3, se: None },
            &StatisticSample::EffectSize { es: 0.5, se: None },
        )
        .unwrap();
    assert!((effect.d - 2.0).abs() < 1e-12);
}

#[test]
fn test_samples_parsed_from_json() {
    let registry = StandardizerRegistry::default();
    let agent: StatisticSample =
        serde_json::from_value(json!({"type": "proportion", "p": 0.5, "n": 100})).unwrap();
    let human: StatisticSample =
        serde_json::from_value(json!({"type": "proportion", "p": 0.6, "n": 100})).unwrap();

    let result = registry.standardize(&agent, &human).unwrap();
    let serialized = serde_json::to_value(&result).unwrap();
    assert_eq!(serialized["details"]["method"], "Freeman-Tukey");
    assert_eq!(serialized["details"]["n_agent"], json!(100.0));
}

#[test]
fn test_invalid_sample_propagates() {
    let registry = StandardizerRegistry::default();
    let err = registry
        .standardize(
            &StatisticSample::Proportion { p: 0.5, n: 0.0 },
            &StatisticSample::Proportion { p: 0.6, n: 100.0 },
        )
        .unwrap_err();
    assert!(matches!(err, StandardizeError::InvalidSample(_)));
}
