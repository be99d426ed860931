use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::provenance::{AllocationProvenance, SchemaVersion};
use strata_core::{Arm, ArmLabel, RngHandle, StratumSlot, Subject};
use tracing::info;

use crate::binarize::binarize;
use crate::blocker::block;
use crate::config::CovariateSpec;
use crate::encoder::encode_covariates;
use crate::hash::stable_hash_string;
use crate::randomizer::{randomize_strata, Tally};

/// Per-subject outcome of one allocation call, indexed by input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AllocationResult {
    /// Arm of each subject as emitted to callers (code or configured label).
    pub assignments: Vec<ArmLabel>,
    /// Arm of each subject.
    pub arms: Vec<Arm>,
    /// Position of each subject's stratum in the processing order.
    pub stratum_ids: Vec<usize>,
    /// Subject indices per stratum, in processing order.
    pub strata: Vec<Vec<usize>>,
}

impl AllocationResult {
    /// Number of allocated subjects.
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    /// Returns `true` when no subject was allocated.
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Arm counts across the whole cohort.
    pub fn tally(&self) -> Tally {
        let treatment = self.arms.iter().filter(|arm| **arm == Arm::Treatment).count();
        Tally {
            control: self.arms.len() - treatment,
            treatment,
        }
    }

    /// Writes the stratum ids into caller-owned records.
    ///
    /// `subjects` must be the cohort that was allocated, in the same order.
    pub fn apply_strata<S: StratumSlot>(&self, subjects: &mut [S]) -> Result<(), StrataError> {
        if subjects.len() != self.stratum_ids.len() {
            return Err(StrataError::Configuration(
                ErrorInfo::new(
                    "cohort-size-mismatch",
                    "stratum ids do not match the number of subjects",
                )
                .with_context("expected", self.stratum_ids.len().to_string())
                .with_context("actual", subjects.len().to_string()),
            ));
        }
        for (subject, stratum) in subjects.iter_mut().zip(&self.stratum_ids) {
            subject.set_stratum(*stratum);
        }
        Ok(())
    }
}

/// Allocates `subjects` to two arms, stratifying on the covariates in `spec`.
///
/// The configuration is validated and every covariate encoded before the
/// first draw from `rng`; any error therefore leaves the random stream and
/// the caller's records untouched. Draw order: stratum shuffle, then for each
/// stratum its arm-1 selections and leftover resolution.
pub fn allocate<S: Subject>(
    subjects: &[S],
    spec: &CovariateSpec,
    rng: &mut RngHandle,
) -> Result<AllocationResult, StrataError> {
    spec.validate()?;
    if subjects.is_empty() {
        info!("empty cohort, nothing to allocate");
        return Ok(AllocationResult::default());
    }

    let encoded = encode_covariates(subjects, spec)?;
    let binary = binarize(&encoded.matrix);
    let mut strata = block(&binary);
    strata.shuffle(rng);

    let (allocations, tally) = randomize_strata(&strata, rng);

    let mut arms = vec![Arm::Control; subjects.len()];
    let mut stratum_ids = vec![0; subjects.len()];
    for (position, allocation) in allocations.iter().enumerate() {
        for (member, arm) in allocation.members.iter().zip(&allocation.arms) {
            arms[*member] = *arm;
            stratum_ids[*member] = position;
        }
    }

    let assignments = match spec.label_pair() {
        Some((control, treatment)) => arms
            .iter()
            .map(|arm| match arm {
                Arm::Control => ArmLabel::Label(control.to_string()),
                Arm::Treatment => ArmLabel::Label(treatment.to_string()),
            })
            .collect(),
        None => arms.iter().map(|arm| ArmLabel::Code(arm.code())).collect(),
    };

    info!(
        subjects = subjects.len(),
        columns = encoded.matrix.cols(),
        strata = strata.len(),
        control = tally.control,
        treatment = tally.treatment,
        "cohort allocated"
    );

    Ok(AllocationResult {
        assignments,
        arms,
        stratum_ids,
        strata: strata.into_iter().map(|stratum| stratum.members).collect(),
    })
}

/// Runs [`allocate`] and, only if it succeeds, stores the stratum ids on
/// the subjects.
pub fn allocate_and_annotate<S: Subject + StratumSlot>(
    subjects: &mut [S],
    spec: &CovariateSpec,
    rng: &mut RngHandle,
) -> Result<AllocationResult, StrataError> {
    let result = allocate(&*subjects, spec, rng)?;
    result.apply_strata(subjects)?;
    Ok(result)
}

/// Allocation bundled with the inputs needed to reproduce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    /// Schema of this record.
    pub schema_version: SchemaVersion,
    /// Configuration the allocation was computed from.
    pub spec: CovariateSpec,
    /// Seed, configuration hash and cohort size.
    pub provenance: AllocationProvenance,
    /// The allocation itself.
    pub result: AllocationResult,
    /// Stable hash over configuration, seed and outcome.
    pub digest: String,
}

/// Allocates with a fresh RNG seeded from `seed` and records provenance.
pub fn allocate_seeded<S: Subject>(
    subjects: &[S],
    spec: &CovariateSpec,
    seed: u64,
) -> Result<AllocationRecord, StrataError> {
    let mut rng = RngHandle::from_seed(seed);
    let result = allocate(subjects, spec, &mut rng)?;
    let spec_hash = stable_hash_string(spec)?;
    let digest = stable_hash_string(&(
        &spec_hash,
        seed,
        &result.assignments,
        &result.stratum_ids,
    ))?;
    let tool_versions = BTreeMap::from([(
        env!("CARGO_PKG_NAME").to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    )]);
    Ok(AllocationRecord {
        schema_version: SchemaVersion::default(),
        spec: spec.clone(),
        provenance: AllocationProvenance {
            spec_hash,
            seed,
            cohort_size: result.len(),
            tool_versions,
        },
        result,
        digest,
    })
}
