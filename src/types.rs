use bson::Document as BsonDocument;

/// Bucket (container namespace) holding every LINCS document.
pub const DEFAULT_NAMESPACE: &str = "LINCS";

/// Sub-document every filter field is qualified into.
pub const METADATA_PREFIX: &str = "metadata.";

/// Field matched case-insensitively by filtered reads.
pub const PERT_DESC_FIELD: &str = "metadata.pert_desc";

/// Document key as stored in the bucket.
pub type DocumentKey = String;

/// One result row returned by the store.
pub type Row = BsonDocument;
