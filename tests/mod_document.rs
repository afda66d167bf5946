use bson::{Bson, Document as BsonDocument, doc};
use lincs_store::document::{
    DocumentKind, FieldKind, INSTANCE_SCHEMA, InstanceRecord, PERT_SCHEMA, PertRecord,
    has_required_fields, pert_key, prepare_instance, prepare_pert, validate,
};
use lincs_store::errors::DbError;

fn pert_doc() -> BsonDocument {
    doc! {
        "method": "zsvc",
        "cell": "A375",
        "perturbagen": "BRD-K12345",
        "dose": 10,
        "duration": "6H",
        "gene_ids": [1, 2, 3],
        "data": [0.1, -1.2, 3.4],
        "gold": true,
    }
}

#[test]
fn presence_check_ignores_types() {
    let d = doc! { "a": 1, "b": Bson::Null };
    assert!(has_required_fields(&d, &["a", "b"]));
    assert!(!has_required_fields(&d, &["a", "c"]));
    assert!(has_required_fields(&d, &[]));
}

#[test]
fn valid_pert_passes() {
    let report = validate(&pert_doc(), PERT_SCHEMA);
    assert!(report.is_valid(), "{report}");
    assert_eq!(report.to_string(), "ok");
}

#[test]
fn missing_and_mistyped_fields_are_reported() {
    let mut d = pert_doc();
    d.remove("method");
    d.remove("duration");
    d.insert("gene_ids", "not-a-list");
    let report = validate(&d, PERT_SCHEMA);
    assert!(!report.is_valid());
    assert!(report.has_missing_fields());
    assert_eq!(report.missing, vec!["method".to_string(), "duration".to_string()]);
    assert_eq!(report.mistyped.len(), 1);
    assert_eq!(report.mistyped[0].field, "gene_ids");
    assert_eq!(report.mistyped[0].expected, FieldKind::Array);
    assert!(!report.has_length_mismatch());
}

#[test]
fn cell_is_optional_but_typed() {
    let mut d = pert_doc();
    d.remove("cell");
    assert!(validate(&d, PERT_SCHEMA).is_valid());
    d.insert("cell", 7);
    assert!(!validate(&d, PERT_SCHEMA).is_valid());
}

#[test]
fn length_mismatch_is_reported() {
    let mut d = pert_doc();
    d.insert("gene_ids", vec![1, 2]);
    d.insert("data", vec![0.1]);
    let report = validate(&d, PERT_SCHEMA);
    assert!(report.has_length_mismatch());
    assert_eq!(report.length_mismatch, Some((2, 1)));
    assert!(report.to_string().contains("gene_ids length 2 does not match data length 1"));
}

#[test]
fn pert_key_joins_identity_fields() {
    assert_eq!(pert_key(&pert_doc()), "zsvc_A375_BRD-K12345_10_6H");
    let mut d = pert_doc();
    d.remove("cell");
    d.insert("dose", 2.5);
    assert_eq!(pert_key(&d), "zsvc__BRD-K12345_2.5_6H");
}

#[test]
fn prepare_pert_marks_kind() {
    let (key, d) = prepare_pert(pert_doc()).unwrap();
    assert_eq!(key, "zsvc_A375_BRD-K12345_10_6H");
    assert_eq!(d.get_str("type").unwrap(), "pert");
    assert!(d.get_bool("gold").unwrap());
}

#[test]
fn prepare_pert_rejects_mismatch() {
    let mut d = pert_doc();
    d.insert("gene_ids", vec![1, 2]);
    d.insert("data", vec![0.1]);
    match prepare_pert(d) {
        Err(DbError::Validation(report)) => assert_eq!(report.length_mismatch, Some((2, 1))),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn prepare_instance_stamps_timestamp() {
    let input = doc! { "metadata": {}, "gene_ids": [1], "data": [0.2], "doctype": "q2norm" };
    assert!(!input.contains_key("timestamp"));
    let d = prepare_instance(input).unwrap();
    let ts = d.get_str("timestamp").unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    assert_eq!(d.get_str("doctype").unwrap(), "q2norm");
}

#[test]
fn prepare_instance_rejects_mismatch() {
    let input = doc! { "metadata": {}, "gene_ids": [1, 2], "data": [0.2], "doctype": "q2norm" };
    match prepare_instance(input) {
        Err(DbError::Validation(r)) => {
            assert!(r.has_length_mismatch());
            assert!(r.missing.is_empty());
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn prepare_instance_requires_metadata_document() {
    let input = doc! { "metadata": "x", "gene_ids": [1], "data": [0.2], "doctype": "q2norm" };
    let e = prepare_instance(input).unwrap_err();
    assert!(matches!(e, DbError::Validation(ref r) if r.mistyped[0].field == "metadata"));
    let input = doc! { "gene_ids": [1], "data": [0.2] };
    match prepare_instance(input) {
        Err(DbError::Validation(r)) => {
            assert_eq!(r.missing, vec!["metadata".to_string(), "doctype".to_string()]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn typed_records_convert_to_valid_documents() {
    let pert = PertRecord {
        method: "zsvc".into(),
        cell: Some("MCF7".into()),
        perturbagen: "BRD-K0001".into(),
        dose: Bson::Double(1.11),
        duration: Bson::Int32(24),
        gene_ids: vec![Bson::Int32(5720), Bson::Int32(466)],
        data: vec![0.5, -0.5],
        extra: doc! { "metadata": { "pert_desc": "Vorinostat" } },
    };
    let d: BsonDocument = pert.into();
    assert!(validate(&d, DocumentKind::Pert.schema()).is_valid());
    assert_eq!(pert_key(&d), "zsvc_MCF7_BRD-K0001_1.11_24");

    let inst = InstanceRecord {
        metadata: doc! { "cell_id": "A375" },
        gene_ids: vec![Bson::Int32(1)],
        data: vec![0.2],
        doctype: "q2norm".into(),
    };
    let d: BsonDocument = inst.into();
    assert!(validate(&d, INSTANCE_SCHEMA).is_valid());
}
