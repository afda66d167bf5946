//! Store collaborator: the trait the client issues requests through, and an
//! in-process implementation that evaluates compiled statements directly.

use crate::config::StoreConfig;
use crate::errors::DbError;
use crate::query::{Statement, StatementKind, bson_equal, eval_predicates, get_path, project_row};
use crate::types::{DocumentKey, Row};
use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument, doc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Lookup against a map/reduce view by key list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    pub design: String,
    pub view: String,
    pub keys: Vec<String>,
}

impl ViewQuery {
    pub fn new(design: impl Into<String>, view: impl Into<String>, keys: Vec<String>) -> Self {
        Self { design: design.into(), view: view.into(), keys }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Runs a compiled statement and returns its rows in order.
    async fn execute(&self, stmt: &Statement) -> Result<Vec<Row>, DbError>;

    /// Runs an aggregate statement and returns its `COUNT`.
    async fn execute_count(&self, stmt: &Statement) -> Result<u64, DbError> {
        let rows = self.execute(stmt).await?;
        let first = rows.first().ok_or_else(|| DbError::Store("count returned no rows".into()))?;
        match first.get("COUNT") {
            Some(Bson::Int32(n)) => u64::try_from(*n).map_err(|e| DbError::Store(e.to_string())),
            Some(Bson::Int64(n)) => u64::try_from(*n).map_err(|e| DbError::Store(e.to_string())),
            other => Err(DbError::Store(format!("count row has no integer COUNT: {other:?}"))),
        }
    }

    /// Creates or overwrites the document stored under `key`.
    async fn upsert(&self, key: &str, doc: BsonDocument) -> Result<(), DbError>;

    async fn view_query(&self, query: &ViewQuery) -> Result<Vec<Row>, DbError>;

    async fn close(&self) -> Result<(), DbError> {
        Ok(())
    }
}

/// Documents kept in key order; views index a single top-level field.
pub struct MemoryStore {
    bucket: String,
    docs: RwLock<BTreeMap<DocumentKey, BsonDocument>>,
    views: RwLock<HashMap<(String, String), String>>,
    closed: AtomicBool,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("bucket", &self.bucket)
            .field("docs", &self.docs.read().len())
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            docs: RwLock::new(BTreeMap::new()),
            views: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Opens a handle for the configured bucket.
    ///
    /// # Errors
    /// Returns `Connection` when the address or bucket name is empty.
    pub fn connect(cfg: &StoreConfig) -> Result<Self, DbError> {
        if cfg.address.trim().is_empty() {
            return Err(DbError::Connection("no store address configured".into()));
        }
        if cfg.bucket.trim().is_empty() {
            return Err(DbError::Connection(format!("no bucket configured for {}", cfg.url())));
        }
        log::info!(
            "opened bucket {} at {} (connect timeout {} ms, op timeout {} ms)",
            cfg.bucket,
            cfg.url(),
            cfg.connection_timeout_ms,
            cfg.operation_timeout_ms
        );
        Ok(Self::new(cfg.bucket.clone()))
    }

    /// Loads newline-delimited JSON documents; each line's `id` string becomes the key.
    ///
    /// # Errors
    /// Fails on I/O errors, malformed lines, or lines without a string `id`.
    pub fn load_ndjson(&self, path: &Path) -> Result<usize, DbError> {
        let file = std::fs::File::open(path)?;
        let mut n = 0usize;
        for (lineno, line) in std::io::BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut doc: BsonDocument = serde_json::from_str(&line)?;
            let key = match doc.remove("id") {
                Some(Bson::String(s)) => s,
                _ => {
                    return Err(DbError::Io(format!(
                        "{}:{}: missing string id",
                        path.display(),
                        lineno + 1
                    )));
                }
            };
            self.docs.write().insert(key, doc);
            n += 1;
        }
        Ok(n)
    }

    /// Makes `design/view` answer lookups on the top-level attribute `key_field`.
    pub fn register_view(&self, design: &str, view: &str, key_field: &str) {
        self.views.write().insert((design.to_string(), view.to_string()), key_field.to_string());
    }

    #[must_use]
    pub fn get_document(&self, key: &str) -> Option<BsonDocument> {
        self.docs.read().get(key).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn ensure_open(&self) -> Result<(), DbError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DbError::Connection(format!("bucket {} is closed", self.bucket)));
        }
        Ok(())
    }

    fn ensure_bucket(&self, stmt: &Statement) -> Result<(), DbError> {
        if stmt.namespace != self.bucket {
            return Err(DbError::Store(format!(
                "keyspace not found: {} (open bucket is {})",
                stmt.namespace, self.bucket
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn execute(&self, stmt: &Statement) -> Result<Vec<Row>, DbError> {
        self.ensure_open()?;
        self.ensure_bucket(stmt)?;
        let docs = self.docs.read();
        let rows = match &stmt.kind {
            StatementKind::Keys(keys) => keys
                .iter()
                .filter_map(|k| docs.get(k).map(|d| project_row(k, d, &stmt.projection)))
                .collect(),
            StatementKind::Count => {
                let n = docs.values().filter(|d| eval_predicates(d, &stmt.predicates)).count();
                let n = i64::try_from(n).map_err(|e| DbError::Store(e.to_string()))?;
                vec![doc! { "COUNT": n }]
            }
            StatementKind::Select => docs
                .iter()
                .filter(|(_, d)| eval_predicates(d, &stmt.predicates))
                .skip(stmt.skip.unwrap_or(0))
                .take(stmt.limit.unwrap_or(usize::MAX))
                .map(|(k, d)| project_row(k, d, &stmt.projection))
                .collect(),
        };
        Ok(rows)
    }

    async fn upsert(&self, key: &str, doc: BsonDocument) -> Result<(), DbError> {
        self.ensure_open()?;
        self.docs.write().insert(key.to_string(), doc);
        Ok(())
    }

    async fn view_query(&self, query: &ViewQuery) -> Result<Vec<Row>, DbError> {
        self.ensure_open()?;
        let key_field = self
            .views
            .read()
            .get(&(query.design.clone(), query.view.clone()))
            .cloned()
            .ok_or_else(|| {
                DbError::Store(format!("view {}/{} not found", query.design, query.view))
            })?;
        let docs = self.docs.read();
        let mut rows = Vec::new();
        for wanted in &query.keys {
            let wanted = Bson::String(wanted.clone());
            for (id, d) in docs.iter() {
                if let Some(k) = get_path(d, &key_field)
                    && bson_equal(k, &wanted)
                {
                    rows.push(doc! { "id": id.clone(), "key": k.clone(), "value": d.clone() });
                }
            }
        }
        Ok(rows)
    }

    async fn close(&self) -> Result<(), DbError> {
        self.closed.store(true, Ordering::Release);
        log::info!("closed bucket {}", self.bucket);
        Ok(())
    }
}
