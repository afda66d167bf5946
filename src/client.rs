use crate::config::Config;
use crate::document::{prepare_instance, prepare_pert};
use crate::errors::DbError;
use crate::query::{Compiler, Filter, QueryOptions, Statement};
use crate::store::{Store, ViewQuery};
use crate::types::{DocumentKey, Row};
use bson::Document as BsonDocument;
use std::sync::Arc;
use std::time::Instant;

/// Design document and view serving z-score lookups by distil id.
pub const ZSVC_DESIGN: &str = "zsvc_distil_id";
pub const ZSVC_VIEW: &str = "zsvc_by_distil";

/// Data I/O against the LINCS bucket.
///
/// Cheap to clone; every clone shares the same store handle. Each operation
/// issues at most one store request.
#[derive(Clone)]
pub struct Lincs {
    store: Arc<dyn Store>,
    compiler: Compiler,
}

impl std::fmt::Debug for Lincs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lincs").field("namespace", &self.compiler.namespace()).finish()
    }
}

impl Lincs {
    pub fn new(store: Arc<dyn Store>, namespace: impl Into<String>) -> Self {
        Self { store, compiler: Compiler::new(namespace) }
    }

    /// Client for the bucket named in `config`.
    pub fn open(config: &Config, store: Arc<dyn Store>) -> Self {
        log::info!("lincs client for bucket {} ({})", config.store.bucket, config.store.url());
        Self::new(store, config.store.bucket.clone())
    }

    #[must_use]
    pub const fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Rows for a set of document keys, all fields.
    ///
    /// # Errors
    /// Surfaces store failures unchanged.
    pub async fn by_ids<I, K>(&self, ids: I) -> Result<Vec<Row>, DbError>
    where
        I: IntoIterator<Item = K>,
        K: ToString,
    {
        self.get(ids, None).await
    }

    /// Rows for a set of document keys with an optional field projection.
    ///
    /// # Errors
    /// Returns `InvalidFilter` for unrenderable fields; surfaces store failures unchanged.
    pub async fn get<I, K>(&self, ids: I, fields: Option<&[String]>) -> Result<Vec<Row>, DbError>
    where
        I: IntoIterator<Item = K>,
        K: ToString,
    {
        let stmt = self.compiler.compile_by_ids(ids, fields)?;
        self.run(&stmt).await
    }

    /// Rows matching `filter`, paged and projected by `opts`.
    ///
    /// # Errors
    /// Returns `InvalidFilter` before touching the store if the filter cannot compile.
    pub async fn query(&self, filter: &Filter, opts: &QueryOptions) -> Result<Vec<Row>, DbError> {
        let stmt = self.compiler.compile(filter, opts, false)?;
        self.run(&stmt).await
    }

    /// Number of documents matching `filter`.
    ///
    /// # Errors
    /// Returns `InvalidFilter` before touching the store if the filter cannot compile.
    pub async fn count(&self, filter: &Filter) -> Result<u64, DbError> {
        let stmt = self.compiler.compile_count(filter)?;
        let started = Instant::now();
        let n = self.store.execute_count(&stmt).await?;
        log::info!(target: "lincs::metrics", "count rows={n} elapsed_ms={} stmt={}", started.elapsed().as_millis(), stmt);
        Ok(n)
    }

    /// Validates and upserts a perturbation-score document; resolves with its derived key.
    ///
    /// # Errors
    /// Returns `Validation` (no write issued) for missing/mistyped fields or a
    /// `gene_ids`/`data` length mismatch; surfaces store failures unchanged.
    pub async fn save_pert(&self, doc: BsonDocument) -> Result<DocumentKey, DbError> {
        let (key, doc) = prepare_pert(doc)?;
        self.store.upsert(&key, doc).await?;
        log::info!(target: "lincs::audit", "upsert pert {key}");
        Ok(key)
    }

    /// Validates, timestamps and upserts an instance document under `id`.
    ///
    /// # Errors
    /// Returns `Validation` (no write issued) for missing/mistyped fields or a
    /// `gene_ids`/`data` length mismatch; surfaces store failures unchanged.
    pub async fn save_instance(
        &self,
        id: impl ToString,
        doc: BsonDocument,
    ) -> Result<DocumentKey, DbError> {
        let id = id.to_string();
        let doc = prepare_instance(doc)?;
        self.store.upsert(&id, doc).await?;
        log::info!(target: "lincs::audit", "upsert instance {id}");
        Ok(id)
    }

    /// z-score rows from the distil-id view.
    ///
    /// # Errors
    /// Surfaces store failures unchanged.
    pub async fn zsvc<I, K>(&self, ids: I) -> Result<Vec<Row>, DbError>
    where
        I: IntoIterator<Item = K>,
        K: ToString,
    {
        let keys = ids.into_iter().map(|k| k.to_string()).collect();
        let query = ViewQuery::new(ZSVC_DESIGN, ZSVC_VIEW, keys);
        self.store.view_query(&query).await
    }

    /// Releases the store handle. Later calls through any clone fail with `Connection`
    /// for stores that track their lifecycle.
    ///
    /// # Errors
    /// Surfaces store failures unchanged.
    pub async fn close(&self) -> Result<(), DbError> {
        self.store.close().await
    }

    async fn run(&self, stmt: &Statement) -> Result<Vec<Row>, DbError> {
        let started = Instant::now();
        let rows = self.store.execute(stmt).await.inspect_err(|e| log::warn!("{stmt}: {e}"))?;
        log::info!(target: "lincs::metrics", "query rows={} elapsed_ms={} stmt={}", rows.len(), started.elapsed().as_millis(), stmt);
        Ok(rows)
    }
}
