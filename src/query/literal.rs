//! Literal rendering for statement text.
//!
//! Values are rendered according to their type: strings become JSON string
//! literals, numbers and booleans are emitted bare. A string that merely looks
//! numeric (`"10"`) stays quoted.

use crate::errors::DbError;
use bson::Bson;

/// # Errors
/// Returns `InvalidFilter` for values that have no literal form (null, documents,
/// arrays, binary data, non-finite doubles, ...).
pub fn render(value: &Bson) -> Result<String, DbError> {
    match value {
        Bson::String(s) => Ok(serde_json::to_string(s)?),
        Bson::Int32(i) => Ok(i.to_string()),
        Bson::Int64(i) => Ok(i.to_string()),
        Bson::Double(f) if f.is_finite() => Ok(f.to_string()),
        Bson::Double(f) => Err(DbError::InvalidFilter(format!("non-finite number {f}"))),
        Bson::Boolean(b) => Ok(b.to_string()),
        other => Err(DbError::InvalidFilter(format!(
            "unsupported literal type {:?}",
            other.element_type()
        ))),
    }
}

/// Renders a membership set as `[a,b,c]`.
///
/// # Errors
/// Fails if any member cannot be rendered by [`render`].
pub fn render_set(values: &[Bson]) -> Result<String, DbError> {
    let items = values.iter().map(render).collect::<Result<Vec<_>, _>>()?;
    Ok(format!("[{}]", items.join(",")))
}

/// True when `value` can appear as a filter literal.
#[must_use]
pub fn is_scalar(value: &Bson) -> bool {
    match value {
        Bson::String(_) | Bson::Int32(_) | Bson::Int64(_) | Bson::Boolean(_) => true,
        Bson::Double(f) => f.is_finite(),
        _ => false,
    }
}
