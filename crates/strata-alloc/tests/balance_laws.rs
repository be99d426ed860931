use std::collections::BTreeSet;

use proptest::prelude::*;
use strata_alloc::{allocate, BalanceReport, CovariateSpec};
use strata_core::{Arm, RngHandle, SubjectRecord};

const INCOME: [&str; 4] = ["low", "lower-middle", "upper-middle", "high"];

fn build_cohort(rows: &[(bool, i64, usize, u8)]) -> Vec<SubjectRecord> {
    rows.iter()
        .enumerate()
        .map(|(id, (female, age, income, region))| {
            SubjectRecord::new(id.to_string())
                .with_attribute("sex", if *female { "female" } else { "male" })
                .with_attribute("age", *age)
                .with_attribute("income", INCOME[*income])
                .with_attribute("region", format!("r{region}"))
        })
        .collect()
}

fn spec() -> CovariateSpec {
    CovariateSpec::new(["sex", "age", "income", "region"]).with_ordinal("income", INCOME)
}

proptest! {
    #[test]
    fn allocations_respect_balance_laws(
        seed in any::<u64>(),
        rows in prop::collection::vec((any::<bool>(), 18i64..80, 0usize..4, 0u8..3), 0..60),
    ) {
        let subjects = build_cohort(&rows);
        let mut rng = RngHandle::from_seed(seed);
        let result = allocate(&subjects, &spec(), &mut rng).unwrap();

        prop_assert_eq!(result.len(), subjects.len());
        prop_assert_eq!(result.stratum_ids.len(), subjects.len());

        let mut seen = BTreeSet::new();
        for (stratum, members) in result.strata.iter().enumerate() {
            prop_assert!(!members.is_empty());
            let treated = members
                .iter()
                .filter(|member| result.arms[**member] == Arm::Treatment)
                .count();
            prop_assert!(treated == members.len() / 2 || treated == (members.len() + 1) / 2);
            for member in members {
                prop_assert!(seen.insert(*member));
                prop_assert_eq!(result.stratum_ids[*member], stratum);
            }
        }
        prop_assert_eq!(seen, (0..subjects.len()).collect::<BTreeSet<_>>());

        let tally = result.tally();
        prop_assert!(tally.imbalance().abs() <= 1);

        let report = BalanceReport::for_cohort(&subjects, &spec(), &result).unwrap();
        prop_assert!(report.max_stratum_gap() <= 1);
        prop_assert_eq!(report.imbalance, tally.imbalance());
    }
}
