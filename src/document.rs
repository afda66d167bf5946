use crate::errors::DbError;
use crate::types::DocumentKey;
use bson::{Bson, Document as BsonDocument, doc};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record kind marker written into pert documents.
pub const PERT_TYPE: &str = "pert";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pert,
    Instance,
}

impl DocumentKind {
    #[must_use]
    pub const fn schema(self) -> &'static [FieldSpec] {
        match self {
            Self::Pert => PERT_SCHEMA,
            Self::Instance => INSTANCE_SCHEMA,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    /// String or number.
    Scalar,
    Array,
    Document,
}

impl FieldKind {
    fn accepts(self, v: &Bson) -> bool {
        match self {
            Self::String => matches!(v, Bson::String(_)),
            Self::Scalar => {
                matches!(v, Bson::String(_) | Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_))
            }
            Self::Array => matches!(v, Bson::Array(_)),
            Self::Document => matches!(v, Bson::Document(_)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(name: &'static str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec { name, kind, required }
}

pub const PERT_SCHEMA: &[FieldSpec] = &[
    field("method", FieldKind::String, true),
    field("cell", FieldKind::String, false),
    field("perturbagen", FieldKind::Scalar, true),
    field("dose", FieldKind::Scalar, true),
    field("duration", FieldKind::Scalar, true),
    field("gene_ids", FieldKind::Array, true),
    field("data", FieldKind::Array, true),
];

pub const INSTANCE_SCHEMA: &[FieldSpec] = &[
    field("metadata", FieldKind::Document, true),
    field("gene_ids", FieldKind::Array, true),
    field("data", FieldKind::Array, true),
    field("doctype", FieldKind::String, true),
];

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: String,
    pub expected: FieldKind,
}

/// Outcome of checking a document against its schema.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub missing: Vec<String>,
    pub mistyped: Vec<FieldMismatch>,
    /// `(gene_ids.len(), data.len())` when they differ.
    pub length_mismatch: Option<(usize, usize)>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty() && self.mistyped.is_empty() && self.length_mismatch.is_none()
    }

    #[must_use]
    pub fn has_missing_fields(&self) -> bool {
        !self.missing.is_empty()
    }

    #[must_use]
    pub const fn has_length_mismatch(&self) -> bool {
        self.length_mismatch.is_some()
    }

    /// # Errors
    /// Returns `DbError::Validation` carrying this report unless it is valid.
    pub fn into_result(self) -> Result<(), DbError> {
        if self.is_valid() { Ok(()) } else { Err(DbError::Validation(self)) }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing fields [{}]", self.missing.join(", ")));
        }
        for m in &self.mistyped {
            parts.push(format!("field '{}' is not {:?}", m.field, m.expected));
        }
        if let Some((genes, data)) = self.length_mismatch {
            parts.push(format!("gene_ids length {genes} does not match data length {data}"));
        }
        if parts.is_empty() {
            f.write_str("ok")
        } else {
            f.write_str(&parts.join("; "))
        }
    }
}

/// Presence-only check: every name in `required` is an attribute of `doc`.
#[must_use]
pub fn has_required_fields(doc: &BsonDocument, required: &[&str]) -> bool {
    required.iter().all(|name| doc.contains_key(name))
}

/// Checks presence and type of every schema field, then that `gene_ids` and
/// `data` have the same length.
#[must_use]
pub fn validate(doc: &BsonDocument, schema: &[FieldSpec]) -> ValidationReport {
    let mut report = ValidationReport::default();
    for entry in schema {
        match doc.get(entry.name) {
            None if entry.required => report.missing.push(entry.name.to_string()),
            None => {}
            Some(v) if !entry.kind.accepts(v) => report
                .mistyped
                .push(FieldMismatch { field: entry.name.to_string(), expected: entry.kind }),
            Some(_) => {}
        }
    }
    if let (Ok(genes), Ok(data)) = (doc.get_array("gene_ids"), doc.get_array("data"))
        && genes.len() != data.len()
    {
        report.length_mismatch = Some((genes.len(), data.len()));
    }
    report
}

/// Derives `method_cell_perturbagen_dose_duration`. A missing cell leaves its
/// segment empty.
///
/// Records loaded by the older JavaScript loader without a cell were keyed with
/// the literal `undefined` in that slot (`zsvc_undefined_...`); they are not
/// found under keys derived here.
#[must_use]
pub fn pert_key(doc: &BsonDocument) -> DocumentKey {
    ["method", "cell", "perturbagen", "dose", "duration"]
        .iter()
        .map(|name| doc.get(name).map(key_segment).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("_")
}

fn key_segment(v: &Bson) -> String {
    match v {
        Bson::String(s) => s.clone(),
        Bson::Int32(i) => i.to_string(),
        Bson::Int64(i) => i.to_string(),
        Bson::Double(f) => f.to_string(),
        Bson::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Validates a pert document and returns its key with the record-kind marker set.
///
/// # Errors
/// Returns `DbError::Validation` if the document does not fit [`PERT_SCHEMA`].
pub fn prepare_pert(mut doc: BsonDocument) -> Result<(DocumentKey, BsonDocument), DbError> {
    validate(&doc, PERT_SCHEMA).into_result()?;
    doc.insert("type", PERT_TYPE);
    let key = pert_key(&doc);
    Ok((key, doc))
}

/// Validates an instance document and stamps its creation time.
///
/// # Errors
/// Returns `DbError::Validation` if the document does not fit [`INSTANCE_SCHEMA`].
pub fn prepare_instance(mut doc: BsonDocument) -> Result<BsonDocument, DbError> {
    validate(&doc, INSTANCE_SCHEMA).into_result()?;
    doc.insert("timestamp", Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    Ok(doc)
}

/// Typed perturbation-score record.
#[derive(Debug, Clone, PartialEq)]
pub struct PertRecord {
    pub method: String,
    pub cell: Option<String>,
    pub perturbagen: String,
    pub dose: Bson,
    pub duration: Bson,
    pub gene_ids: Vec<Bson>,
    pub data: Vec<f64>,
    /// Additional attributes (metadata, gold, ...) copied verbatim.
    pub extra: BsonDocument,
}

impl From<PertRecord> for BsonDocument {
    fn from(r: PertRecord) -> Self {
        let mut out = r.extra;
        out.insert("method", r.method);
        if let Some(cell) = r.cell {
            out.insert("cell", cell);
        }
        out.insert("perturbagen", r.perturbagen);
        out.insert("dose", r.dose);
        out.insert("duration", r.duration);
        out.insert("gene_ids", r.gene_ids);
        out.insert("data", r.data);
        out
    }
}

/// Typed instance record (e.g. level 2 `q2norm` data).
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRecord {
    pub metadata: BsonDocument,
    pub gene_ids: Vec<Bson>,
    pub data: Vec<f64>,
    pub doctype: String,
}

impl From<InstanceRecord> for BsonDocument {
    fn from(r: InstanceRecord) -> Self {
        doc! {
            "metadata": r.metadata,
            "gene_ids": r.gene_ids,
            "data": r.data,
            "doctype": r.doctype,
        }
    }
}
