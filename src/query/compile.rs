use crate::errors::DbError;
use crate::types::DEFAULT_NAMESPACE;

use super::field::{check_path, qualify, render_path, render_segment};
use super::predicate;
use super::types::{
    Filter, Projection, QueryOptions, Statement, StatementKind,
};

/// Turns filters and key lists into statements against one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    namespace: String,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl Compiler {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into() }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Compiles a filtered read, or a `COUNT` aggregate when `count_only` is set.
    ///
    /// Predicates appear in the filter's iteration order; compound indexes on the
    /// bucket depend on it.
    ///
    /// # Errors
    /// Returns `InvalidFilter` when the filter is empty or holds a field or value
    /// that cannot be rendered.
    pub fn compile(
        &self,
        filter: &Filter,
        opts: &QueryOptions,
        count_only: bool,
    ) -> Result<Statement, DbError> {
        if filter.is_empty() {
            return Err(DbError::InvalidFilter("filter has no fields".into()));
        }
        let ns = render_segment(&self.namespace);

        let mut predicates = Vec::with_capacity(filter.len());
        for (field, value) in filter.iter() {
            let qualified = qualify(field);
            check_path(&qualified)?;
            predicates.push(predicate::build(&qualified, value)?);
        }

        let (kind, projection, mut text) = if count_only {
            (
                StatementKind::Count,
                Projection::All,
                format!("SELECT COUNT(META().id) AS COUNT FROM {ns}"),
            )
        } else {
            let (projection, select) = self.projection(opts.fields.as_deref())?;
            (StatementKind::Select, projection, format!("SELECT META().id, {select} FROM {ns}"))
        };

        let clauses: Vec<&str> = predicates.iter().map(|p| p.clause.as_str()).collect();
        text.push_str(" WHERE ");
        text.push_str(&clauses.join(" AND "));

        let limit = opts.limit.filter(|n| *n > 0);
        let skip = opts.skip.filter(|n| *n > 0);
        if let Some(n) = limit {
            text.push_str(&format!(" LIMIT {n}"));
        }
        if let Some(n) = skip {
            text.push_str(&format!(" OFFSET {n}"));
        }

        log::debug!("compiled: {text}");
        Ok(Statement {
            text,
            namespace: self.namespace.clone(),
            kind,
            projection,
            predicates,
            skip,
            limit,
        })
    }

    /// Shorthand for a `COUNT` over `filter` with no paging.
    ///
    /// # Errors
    /// Same as [`Compiler::compile`].
    pub fn compile_count(&self, filter: &Filter) -> Result<Statement, DbError> {
        self.compile(filter, &QueryOptions::default(), true)
    }

    /// Compiles a `USE KEYS` lookup. Ids are coerced to strings.
    ///
    /// # Errors
    /// Returns `InvalidFilter` if a projected field cannot be rendered.
    pub fn compile_by_ids<I, K>(&self, ids: I, fields: Option<&[String]>) -> Result<Statement, DbError>
    where
        I: IntoIterator<Item = K>,
        K: ToString,
    {
        let keys: Vec<String> = ids.into_iter().map(|k| k.to_string()).collect();
        let ns = render_segment(&self.namespace);
        let (projection, select) = self.projection(fields)?;
        let text =
            format!("SELECT META().id, {select} FROM {ns} USE KEYS {}", serde_json::to_string(&keys)?);
        log::debug!("compiled: {text}");
        Ok(Statement {
            text,
            namespace: self.namespace.clone(),
            kind: StatementKind::Keys(keys),
            projection,
            predicates: Vec::new(),
            skip: None,
            limit: None,
        })
    }

    fn projection(&self, fields: Option<&[String]>) -> Result<(Projection, String), DbError> {
        let ns = render_segment(&self.namespace);
        let fields = match fields {
            None => return Ok((Projection::All, format!("{ns}.*"))),
            Some(f) if f.is_empty() || f.iter().any(|x| x == "*") => {
                return Ok((Projection::All, format!("{ns}.*")));
            }
            Some(f) => f,
        };
        let mut rendered = Vec::with_capacity(fields.len());
        for f in fields {
            check_path(f)?;
            rendered.push(format!("{ns}.{}", render_path(f)));
        }
        Ok((Projection::Fields(fields.to_vec()), rendered.join(", ")))
    }
}
