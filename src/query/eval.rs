use bson::{Bson, Document as BsonDocument};

use super::predicate::fold_case;
use super::types::{Predicate, Projection};

/// True when `doc` satisfies every predicate.
pub fn eval_predicates(doc: &BsonDocument, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|p| eval_predicate(doc, p))
}

pub fn eval_predicate(doc: &BsonDocument, p: &Predicate) -> bool {
    let Some(v) = get_path(doc, &p.path) else {
        return false;
    };
    if p.case_insensitive {
        // lower() of a non-string yields null, which never compares equal
        if !matches!(v, Bson::String(_)) {
            return false;
        }
        let folded = fold_case(v);
        return p.values.iter().any(|x| bson_equal(&folded, x));
    }
    p.values.iter().any(|x| bson_equal(v, x))
}

pub fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() {
        return None;
    }
    let parts: Vec<&str> = path.split('.').collect();
    let (last, parents) = parts.split_last()?;
    let mut cur = doc;
    for part in parents {
        match cur.get(*part) {
            Some(Bson::Document(d)) => cur = d,
            _ => return None,
        }
    }
    cur.get(*last)
}

/// Numbers compare by value across integer/double widths; everything else by equality.
pub fn bson_equal(a: &Bson, b: &Bson) -> bool {
    use bson::Bson as T;
    fn as_f64_num(x: &T) -> Option<f64> {
        match x {
            T::Int32(i) => Some(f64::from(*i)),
            #[allow(clippy::cast_precision_loss)]
            T::Int64(i) => Some(*i as f64),
            T::Double(f) => Some(*f),
            _ => None,
        }
    }
    match (a, b) {
        (T::Int32(_) | T::Int64(_) | T::Double(_), T::Int32(_) | T::Int64(_) | T::Double(_)) => {
            as_f64_num(a) == as_f64_num(b)
        }
        _ => a == b,
    }
}

/// Shapes a stored document into a result row: `id` plus either every top-level
/// attribute or each projected path keyed by its last segment.
///
/// The document key always wins the `id` column. A projected path whose last
/// segment is already taken (`metadata.id`, or two paths ending in the same
/// name) is keyed by its full path instead.
pub fn project_row(key: &str, doc: &BsonDocument, projection: &Projection) -> BsonDocument {
    let mut out = BsonDocument::new();
    out.insert("id", key);
    match projection {
        Projection::All => {
            for (k, v) in doc {
                if k != "id" {
                    out.insert(k.clone(), v.clone());
                }
            }
        }
        Projection::Fields(fields) => {
            for f in fields {
                if let Some(v) = get_path(doc, f) {
                    let last = f.rsplit('.').next().unwrap_or(f);
                    let name = if out.contains_key(last) { f.as_str() } else { last };
                    out.insert(name, v.clone());
                }
            }
        }
    }
    out
}
