#![allow(dead_code)]

use strata_alloc::CovariateSpec;
use strata_core::SubjectRecord;

pub const EDUCATION: [&str; 5] = [
    "Primary education",
    "Secondary Education",
    "Bachelor Degree",
    "Master Degree",
    "Doctoral Degree",
];

pub fn participant(id: usize, sex: &str, education: &str) -> SubjectRecord {
    SubjectRecord::new(format!("p{id}"))
        .with_attribute("sex", sex)
        .with_attribute("education", education)
}

pub fn survey_spec() -> CovariateSpec {
    CovariateSpec::new(["sex", "education"]).with_ordinal("education", EDUCATION)
}
