//! Data access for LINCS documents held in a document store.
//!
//! Filters (ordered field -> value(s) maps) compile into N1QL-style statements
//! that a [`store::Store`] executes; perturbation-score and instance documents
//! are validated against their schema before they are written.
//!
//! ```no_run
//! use lincs_store::{Lincs, config::Config, query::{Filter, QueryOptions}, store::MemoryStore};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), lincs_store::errors::DbError> {
//! let cfg = Config::load(None)?;
//! let store = Arc::new(MemoryStore::connect(&cfg.store)?);
//! let lincs = Lincs::open(&cfg, store);
//! let filter = Filter::new().with("pert_desc", "Clindamycin").with("cell_id", "A375");
//! let rows = lincs.query(&filter, &QueryOptions::default().limit(10)).await?;
//! # let _ = rows;
//! lincs.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod document;
pub mod errors;
pub mod logger;
pub mod query;
pub mod store;
pub mod types;

pub use client::Lincs;

/// Initializes the logging system.
///
/// This function should be called before any other operations.
/// It sets up the logger from `log4rs.yaml` in the working directory.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()?;
    Ok(())
}
