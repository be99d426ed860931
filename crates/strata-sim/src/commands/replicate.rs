use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use serde::{Deserialize, Serialize};
use strata_alloc::{allocate, CovariateSpec};
use strata_core::errors::StrataError;
use strata_core::{RngHandle, SubjectRecord};
use tracing::info;

use crate::cohort::{load_cohort, load_spec};

#[derive(Args, Debug)]
pub struct ReplicateArgs {
    /// YAML covariate specification.
    #[arg(long)]
    pub spec: PathBuf,
    /// CSV cohort, one row per subject.
    #[arg(long)]
    pub subjects: PathBuf,
    /// Master seed; replicate `i` uses substream `i`.
    #[arg(long)]
    pub seed: u64,
    /// Number of independent allocations.
    #[arg(long, default_value_t = 2000)]
    pub runs: u64,
}

/// Aggregate over repeated allocations of one cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationSummary {
    /// Number of allocations performed.
    pub runs: u64,
    /// Seed the per-run substreams were derived from.
    pub master_seed: u64,
    /// Share of runs in which each subject landed in arm 1, keyed by subject id.
    pub treatment_share: BTreeMap<String, f64>,
    /// Share of all subject assignments that went to arm 1.
    pub overall_treatment_share: f64,
    /// Largest |arm 1 - arm 0| observed in any run.
    pub max_imbalance: u64,
    /// Number of strata formed; identical in every run.
    pub strata: usize,
}

pub fn run(args: &ReplicateArgs) -> Result<ReplicationSummary, Box<dyn Error>> {
    let spec = load_spec(&args.spec)?;
    let subjects = load_cohort(&args.subjects)?;
    let summary = replicate(&subjects, &spec, args.seed, args.runs)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(summary)
}

/// Allocates `subjects` `runs` times on independent substreams of `seed`.
pub fn replicate(
    subjects: &[SubjectRecord],
    spec: &CovariateSpec,
    seed: u64,
    runs: u64,
) -> Result<ReplicationSummary, StrataError> {
    let mut treated = vec![0u64; subjects.len()];
    let mut max_imbalance = 0u64;
    let mut strata = 0;
    for run in 0..runs {
        let mut rng = RngHandle::for_substream(seed, run);
        let result = allocate(subjects, spec, &mut rng)?;
        for (count, arm) in treated.iter_mut().zip(&result.arms) {
            *count += u64::from(arm.code());
        }
        max_imbalance = max_imbalance.max(result.tally().imbalance().unsigned_abs());
        strata = result.strata.len();
    }

    let denominator = runs.max(1) as f64;
    let treatment_share = subjects
        .iter()
        .zip(&treated)
        .map(|(subject, count)| (subject.id.as_str().to_string(), *count as f64 / denominator))
        .collect();
    let total: u64 = treated.iter().sum();
    let assignments = (runs * subjects.len() as u64).max(1) as f64;
    info!(runs, max_imbalance, "replication finished");
    Ok(ReplicationSummary {
        runs,
        master_seed: seed,
        treatment_share,
        overall_treatment_share: total as f64 / assignments,
        max_imbalance,
        strata,
    })
}
