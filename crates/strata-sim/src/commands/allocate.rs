use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use strata_alloc::{allocate_seeded, to_canonical_json_bytes, AllocationRecord, BalanceReport};
use strata_core::SubjectRecord;
use tracing::info;

use crate::cohort::{load_cohort, load_spec};

#[derive(Args, Debug)]
pub struct AllocateArgs {
    /// YAML covariate specification.
    #[arg(long)]
    pub spec: PathBuf,
    /// CSV cohort, one row per subject.
    #[arg(long)]
    pub subjects: PathBuf,
    /// Master seed for the allocation.
    #[arg(long)]
    pub seed: u64,
    /// Output directory for the allocation artefacts.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &AllocateArgs) -> Result<AllocationRecord, Box<dyn Error>> {
    let spec = load_spec(&args.spec)?;
    let mut subjects = load_cohort(&args.subjects)?;
    let record = allocate_seeded(&subjects, &spec, args.seed)?;
    record.result.apply_strata(&mut subjects)?;
    let balance = BalanceReport::for_cohort(&subjects, &spec, &record.result)?;

    fs::create_dir_all(&args.out)?;
    fs::write(args.out.join("allocation.json"), to_canonical_json_bytes(&record)?)?;
    fs::write(args.out.join("balance.json"), to_canonical_json_bytes(&balance)?)?;
    write_assignments(&args.out.join("assignments.csv"), &subjects, &record)?;
    info!(
        out = %args.out.display(),
        digest = %record.digest,
        "allocation written"
    );
    Ok(record)
}

fn write_assignments(
    path: &Path,
    subjects: &[SubjectRecord],
    record: &AllocationRecord,
) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["id", "arm", "stratum"])?;
    for (subject, assignment) in subjects.iter().zip(&record.result.assignments) {
        let arm = assignment.to_string();
        let stratum = subject.stratum.map(|id| id.to_string()).unwrap_or_default();
        writer.write_record([subject.id.as_str(), arm.as_str(), stratum.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
