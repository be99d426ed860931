use strata_core::provenance::{AllocationProvenance, SchemaVersion};
use strata_core::{ArmLabel, AttributeValue, SubjectRecord};

#[test]
fn provenance_round_trip_json() {
    let provenance = AllocationProvenance {
        spec_hash: "spec".into(),
        seed: 99,
        cohort_size: 12,
        tool_versions: [("strata-core".into(), "0.1.0".into())]
            .into_iter()
            .collect(),
    };
    let json = serde_json::to_string_pretty(&provenance).expect("serialize");
    let decoded: AllocationProvenance = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, provenance);
    assert_eq!(SchemaVersion::default(), SchemaVersion::new(1, 0, 0));
}

#[test]
fn attribute_values_deserialize_untagged() {
    let record: SubjectRecord = serde_json::from_str(
        r#"{"id": "p1", "attributes": {"age": 34, "sex": "female"}}"#,
    )
    .expect("deserialize");
    assert_eq!(record.attributes["age"], AttributeValue::Number(34.0));
    assert_eq!(record.attributes["sex"], AttributeValue::Text("female".into()));
    assert_eq!(record.stratum, None);
}

#[test]
fn arm_labels_serialize_as_plain_values() {
    let labels = vec![ArmLabel::Code(1), ArmLabel::Label("control".into())];
    let json = serde_json::to_string(&labels).expect("serialize");
    assert_eq!(json, r#"[1,"control"]"#);
}
