use strata_alloc::{from_yaml_slice, to_yaml_string, CovariateSpec, NominalEncoding};
use strata_core::{AttributeValue, StrataError};

const SURVEY_SPEC: &str = r#"
var_names: [sex, education, previous_donation]
ordinal:
  education: [Primary education, Secondary Education, Bachelor Degree, Master Degree, Doctoral Degree]
  previous_donation: [0, "1 - 500", "500 - 2,000", "2,000 - 5,000", "> 5,000"]
treatment_labels: [control, matching]
"#;

#[test]
fn survey_spec_loads_from_yaml() {
    let spec = CovariateSpec::from_yaml(SURVEY_SPEC.as_bytes()).unwrap();
    assert_eq!(spec.var_names, ["sex", "education", "previous_donation"]);
    assert_eq!(spec.ordinal["education"].len(), 5);
    assert_eq!(spec.ordinal["previous_donation"][0], AttributeValue::Number(0.0));
    assert!(spec.cardinal.is_empty());
    assert_eq!(spec.nominal_encoding, NominalEncoding::OneHot);
    spec.validate().unwrap();
}

#[test]
fn compatibility_switch_is_spelled_in_kebab_case() {
    let spec: CovariateSpec =
        from_yaml_slice(b"var_names: [job]\nnominal_encoding: first-indicator\n").unwrap();
    assert_eq!(spec.nominal_encoding, NominalEncoding::FirstIndicator);
}

#[test]
fn yaml_round_trip_preserves_spec() {
    let spec = CovariateSpec::from_yaml(SURVEY_SPEC.as_bytes()).unwrap();
    let yaml = to_yaml_string(&spec).unwrap();
    let restored = CovariateSpec::from_yaml(yaml.as_bytes()).unwrap();
    assert_eq!(restored, spec);
}

#[test]
fn malformed_yaml_is_a_serde_error() {
    let err = CovariateSpec::from_yaml(b"var_names: {").unwrap_err();
    assert!(matches!(err, StrataError::Serde(_)));
    assert_eq!(err.info().code, "yaml_deserialize");
}
