use bson::{Bson, Document as BsonDocument};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Eq,
    In,
}

impl Op {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::In => "IN",
        }
    }
}

/// One compiled comparison clause.
///
/// `values` holds the right-hand literals exactly as they were rendered into
/// `clause` (already lower-cased when `case_insensitive` is set).
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub path: String,
    pub op: Op,
    pub values: Vec<Bson>,
    pub case_insensitive: bool,
    pub clause: String,
}

/// Ordered field -> value(s) mapping.
///
/// A `Bson::Array` value is a membership set; anything else is a single value.
/// Entry order is kept exactly as supplied, since predicate order follows it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    entries: Vec<(String, Bson)>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.push(field, value);
        self
    }

    pub fn push(&mut self, field: impl Into<String>, value: impl Into<Bson>) {
        self.entries.push((field.into(), value.into()));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bson)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<BsonDocument> for Filter {
    fn from(doc: BsonDocument) -> Self {
        Self { entries: doc.into_iter().collect() }
    }
}

impl<K: Into<String>, V: Into<Bson>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Options for filtered reads.
///
/// Semantics:
/// - `fields` of `None` projects every top-level attribute.
/// - `skip` and `limit` of `None` or `0` add no clause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub fields: Option<Vec<String>>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl QueryOptions {
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    All,
    Fields(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Count,
    Keys(Vec<String>),
}

/// A compiled statement: the text sent to the store plus the plan it encodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub namespace: String,
    pub kind: StatementKind,
    pub projection: Projection,
    pub predicates: Vec<Predicate>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl Statement {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn is_count(&self) -> bool {
        matches!(self.kind, StatementKind::Count)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
