use crate::errors::DbError;
use crate::types::METADATA_PREFIX;

/// Qualifies a filter field into the `metadata` sub-document.
///
/// Any number of leading `metadata.` prefixes collapse to exactly one, so
/// `qualify(qualify(x)) == qualify(x)`.
#[must_use]
pub fn qualify(field: &str) -> String {
    let mut rest = field;
    while let Some(stripped) = rest.strip_prefix(METADATA_PREFIX) {
        rest = stripped;
    }
    format!("{METADATA_PREFIX}{rest}")
}

/// Rejects paths that cannot be rendered into a statement.
///
/// # Errors
/// Returns `InvalidFilter` for empty paths, empty segments, or back-ticks.
pub fn check_path(path: &str) -> Result<(), DbError> {
    if path.is_empty() {
        return Err(DbError::InvalidFilter("empty field name".into()));
    }
    for seg in path.split('.') {
        if seg.is_empty() {
            return Err(DbError::InvalidFilter(format!("empty segment in field '{path}'")));
        }
        if seg.contains('`') {
            return Err(DbError::InvalidFilter(format!("back-tick in field '{path}'")));
        }
    }
    Ok(())
}

/// Renders a dotted path, escaping segments that are not plain identifiers.
#[must_use]
pub fn render_path(path: &str) -> String {
    path.split('.').map(render_segment).collect::<Vec<_>>().join(".")
}

pub(crate) fn render_segment(seg: &str) -> String {
    if seg == "*" || is_identifier(seg) { seg.to_string() } else { format!("`{seg}`") }
}

fn is_identifier(seg: &str) -> bool {
    let mut chars = seg.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
