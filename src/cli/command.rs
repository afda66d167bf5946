use crate::document::DocumentKind;
use std::path::PathBuf;

pub enum Command {
    // Statement compilation (no store round-trip)
    Compile {
        filter_json: String,
        fields: Option<String>,
        skip: Option<usize>,
        limit: Option<usize>,
        count: bool,
    },
    Keys {
        ids: Vec<String>,
        fields: Option<String>,
    },
    Validate {
        kind: DocumentKind,
        file: PathBuf,
    },
    // Reads
    Query {
        filter_json: String,
        fields: Option<String>,
        skip: Option<usize>,
        limit: Option<usize>,
    },
    Count {
        filter_json: String,
    },
    Get {
        ids: Vec<String>,
        fields: Option<String>,
    },
}
