use crate::errors::DbError;
use bson::Document as BsonDocument;

use super::types::Filter;

/// Parses a JSON object into a [`Filter`], keeping key order.
///
/// # Errors
/// Returns `InvalidFilter` if the text is not a JSON object.
pub fn parse_filter_json(json: &str) -> Result<Filter, DbError> {
    let doc: BsonDocument = serde_json::from_str(json)
        .map_err(|e| DbError::InvalidFilter(format!("filter must be a JSON object: {e}")))?;
    Ok(Filter::from(doc))
}

/// Splits a comma-separated projection list, dropping blanks.
#[must_use]
pub fn parse_field_list(list: &str) -> Vec<String> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}
