use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use strata_alloc::{from_json_slice, AllocationRecord};
use strata_sim::commands::allocate::{self, AllocateArgs};
use strata_sim::commands::replicate::{self, ReplicateArgs};
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

fn allocate_args(out: PathBuf, seed: u64) -> AllocateArgs {
    AllocateArgs {
        spec: fixture("survey_spec.yaml"),
        subjects: fixture("survey_cohort.csv"),
        seed,
        out,
    }
}

#[test]
fn allocate_writes_artefacts() {
    let dir = tempdir().expect("tempdir");
    let record = allocate::run(&allocate_args(dir.path().to_path_buf(), 11)).expect("allocate");
    assert_eq!(record.result.len(), 11);
    assert!(record.result.tally().imbalance().abs() <= 1);

    let reloaded: AllocationRecord =
        from_json_slice(&fs::read(dir.path().join("allocation.json")).unwrap()).unwrap();
    assert_eq!(reloaded, record);
    assert_eq!(reloaded.provenance.seed, 11);

    let balance: Value =
        serde_json::from_slice(&fs::read(dir.path().join("balance.json")).unwrap()).unwrap();
    let control = balance["control"].as_u64().unwrap();
    let treatment = balance["treatment"].as_u64().unwrap();
    assert_eq!(control + treatment, 11);

    let csv = fs::read_to_string(dir.path().join("assignments.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("id,arm,stratum"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 11);
    assert!(rows[0].starts_with("s01,"));
    assert!(rows
        .iter()
        .all(|row| row.contains(",control,") || row.contains(",matching,")));
}

#[test]
fn allocate_is_reproducible_across_runs() {
    let first = tempdir().expect("tempdir");
    let second = tempdir().expect("tempdir");
    allocate::run(&allocate_args(first.path().to_path_buf(), 5)).expect("first");
    allocate::run(&allocate_args(second.path().to_path_buf(), 5)).expect("second");
    for name in ["allocation.json", "balance.json", "assignments.csv"] {
        assert_eq!(
            fs::read(first.path().join(name)).unwrap(),
            fs::read(second.path().join(name)).unwrap(),
            "{name} differs between identical runs"
        );
    }
}

#[test]
fn replicate_summarises_arm_shares() {
    let args = ReplicateArgs {
        spec: fixture("survey_spec.yaml"),
        subjects: fixture("survey_cohort.csv"),
        seed: 3,
        runs: 400,
    };
    let summary = replicate::run(&args).expect("replicate");
    assert_eq!(summary.runs, 400);
    assert_eq!(summary.treatment_share.len(), 11);
    assert!(summary.max_imbalance <= 1);
    assert!((summary.overall_treatment_share - 0.5).abs() < 0.05);
    for share in summary.treatment_share.values() {
        assert!((0.3..=0.7).contains(share), "share {share} out of range");
    }
}

#[test]
fn missing_spec_file_is_reported() {
    let dir = tempdir().expect("tempdir");
    let mut args = allocate_args(dir.path().join("out"), 1);
    args.spec = dir.path().join("absent.yaml");
    let err = allocate::run(&args).unwrap_err();
    assert!(err.to_string().contains("spec-open"));
}
