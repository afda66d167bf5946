use crate::errors::DbError;
use crate::types::PERT_DESC_FIELD;
use bson::Bson;

use super::field::render_path;
use super::literal::{is_scalar, render, render_set};
use super::types::{Op, Predicate};

/// Builds the clause for one qualified field.
///
/// Scalars compile to `=`, sets with more than one member to `IN`. The
/// perturbagen description is stored with inconsistent casing, so it is compared
/// through `lower(...)` against lower-cased literals.
///
/// # Errors
/// Returns `InvalidFilter` for empty sets or values that are not scalars.
pub fn build(qualified: &str, value: &Bson) -> Result<Predicate, DbError> {
    let case_insensitive = qualified == PERT_DESC_FIELD;
    let mut values = normalize(qualified, value)?;
    if case_insensitive {
        values = values.iter().map(fold_case).collect();
    }

    let (op, right) = match values.as_slice() {
        [single] => (Op::Eq, render(single)?),
        _ => (Op::In, render_set(&values)?),
    };
    let path = render_path(qualified);
    let left = if case_insensitive { format!("lower({path})") } else { path };
    let clause = format!("{left} {} {right}", op.as_str());

    Ok(Predicate { path: qualified.to_string(), op, values, case_insensitive, clause })
}

fn normalize(field: &str, value: &Bson) -> Result<Vec<Bson>, DbError> {
    match value {
        Bson::Array(items) if items.is_empty() => {
            Err(DbError::InvalidFilter(format!("empty value set for '{field}'")))
        }
        Bson::Array(items) => items.iter().map(|v| member(field, v)).collect(),
        other => member(field, other).map(|v| vec![v]),
    }
}

fn member(field: &str, value: &Bson) -> Result<Bson, DbError> {
    if is_scalar(value) {
        Ok(value.clone())
    } else {
        Err(DbError::InvalidFilter(format!(
            "'{field}' value {value} is not a string, number or boolean"
        )))
    }
}

pub(crate) fn fold_case(value: &Bson) -> Bson {
    match value {
        Bson::String(s) => Bson::String(s.to_lowercase()),
        other => other.clone(),
    }
}
