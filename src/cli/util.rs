use crate::errors::DbError;
use crate::query::parse_field_list;
use bson::{Bson, Document as BsonDocument};
use std::path::Path;

pub fn parse_fields(s: Option<&str>) -> Option<Vec<String>> {
    s.map(parse_field_list).filter(|f| !f.is_empty())
}

pub fn read_document(path: &Path) -> Result<BsonDocument, DbError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn row_to_json(row: BsonDocument) -> serde_json::Value {
    Bson::Document(row).into_relaxed_extjson()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_parsing() {
        assert_eq!(
            parse_fields(Some("metadata.pert_desc, gene_ids")),
            Some(vec!["metadata.pert_desc".to_string(), "gene_ids".to_string()])
        );
        assert_eq!(parse_fields(Some(" , ")), None);
        assert_eq!(parse_fields(None), None);
    }
}
