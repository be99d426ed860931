mod common;

use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use strata_alloc::{
    allocate, allocate_seeded, binarize, block, encode_covariates, to_canonical_json_bytes,
};
use strata_core::{Arm, RngHandle, SubjectRecord};

use common::{participant, survey_spec, EDUCATION};

fn cohort(size: usize) -> Vec<SubjectRecord> {
    (0..size)
        .map(|id| {
            let sex = if id % 3 == 0 { "female" } else { "male" };
            participant(id, sex, EDUCATION[id % EDUCATION.len()])
                .with_attribute("age", (18 + (id * 7) % 50) as i64)
        })
        .collect()
}

#[test]
fn repeated_runs_with_same_seed_match() {
    let subjects = cohort(37);
    let spec = survey_spec();
    let mut spec_with_age = spec.clone();
    spec_with_age.var_names.push("age".into());

    for spec in [spec, spec_with_age] {
        let mut rng_a = RngHandle::from_seed(2024);
        let mut rng_b = RngHandle::from_seed(2024);
        let a = allocate(&subjects, &spec, &mut rng_a).unwrap();
        let b = allocate(&subjects, &spec, &mut rng_b).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn seeded_records_are_byte_identical() {
    let subjects = cohort(25);
    let record_a = allocate_seeded(&subjects, &survey_spec(), 99).unwrap();
    let record_b = allocate_seeded(&subjects, &survey_spec(), 99).unwrap();
    assert_eq!(record_a.digest, record_b.digest);
    assert_eq!(
        to_canonical_json_bytes(&record_a).unwrap(),
        to_canonical_json_bytes(&record_b).unwrap()
    );
    assert_eq!(record_a.provenance.seed, 99);
    assert_eq!(record_a.provenance.cohort_size, 25);
}

#[test]
fn different_seeds_explore_different_allocations() {
    let subjects = cohort(40);
    let digests: std::collections::BTreeSet<String> = (0..8)
        .map(|seed| allocate_seeded(&subjects, &survey_spec(), seed).unwrap().digest)
        .collect();
    assert!(digests.len() > 1);
}

#[test]
fn draws_follow_shuffle_then_per_stratum_order() {
    let subjects = cohort(23);
    let spec = survey_spec();
    let encoded = encode_covariates(&subjects, &spec).unwrap();
    let profiles = block(&binarize(&encoded.matrix));
    assert!(profiles.iter().any(|stratum| stratum.len() % 2 == 1));

    for seed in 0..50 {
        let mut rng = RngHandle::from_seed(seed);
        let result = allocate(&subjects, &spec, &mut rng).unwrap();

        let mut replay = RngHandle::from_seed(seed);
        let mut strata = profiles.clone();
        strata.shuffle(&mut replay);

        let mut expected = vec![Arm::Control; subjects.len()];
        let (mut control, mut treatment) = (0usize, 0usize);
        for stratum in &strata {
            let mut open = stratum.members.clone();
            for _ in 0..stratum.len() / 2 {
                let pick = replay.gen_range(0..open.len());
                expected[open.remove(pick)] = Arm::Treatment;
            }
            if stratum.len() % 2 == 1 {
                let leftover_to_treatment = match control.cmp(&treatment) {
                    Ordering::Equal => replay.gen_bool(0.5),
                    Ordering::Greater => true,
                    Ordering::Less => false,
                };
                if leftover_to_treatment {
                    let pick = replay.gen_range(0..open.len());
                    expected[open.remove(pick)] = Arm::Treatment;
                }
            }
            let treated = stratum
                .members
                .iter()
                .filter(|member| expected[**member] == Arm::Treatment)
                .count();
            treatment += treated;
            control += stratum.len() - treated;
        }

        let order: Vec<Vec<usize>> = strata.into_iter().map(|stratum| stratum.members).collect();
        assert_eq!(result.strata, order, "seed {seed}");
        assert_eq!(result.arms, expected, "seed {seed}");
        assert_eq!(rng.next_u64(), replay.next_u64(), "seed {seed}");
    }
}
