//! Connection configuration.
//!
//! One TOML file carries a `prod` and a `devel` environment; `devel` is chosen
//! when `LINCS_DEVEL` is set. Lookup precedence: explicit path, `LINCS_CONFIG`,
//! `~/.config/lincs.toml`, `./lincs.toml`, then built-in defaults. `LINCS_ADDRESS`,
//! `LINCS_BUCKET` and `LINCS_PASSWORD` override whatever was loaded.

use crate::errors::DbError;
use crate::types::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Prod,
    Devel,
}

impl Environment {
    /// `Devel` when `LINCS_DEVEL` is present and not empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup("LINCS_DEVEL") {
            Some(v) if !v.is_empty() => Self::Devel,
            _ => Self::Prod,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub address: String,
    pub port: u16,
    pub bucket: String,
    pub password: Option<String>,
    pub connection_timeout_ms: u64,
    pub operation_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            address: "10.152.220.31".into(),
            port: 8091,
            bucket: DEFAULT_NAMESPACE.into(),
            password: None,
            connection_timeout_ms: 5000,
            operation_timeout_ms: 5000,
        }
    }
}

impl StoreConfig {
    /// `couchbase://<address>` style URL for the cluster.
    #[must_use]
    pub fn url(&self) -> String {
        format!("couchbase://{}:{}", self.address, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: String,
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self { version: "1.0".into(), store: StoreConfig::default() }
    }
}

/// On-disk layout: one section per environment.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    prod: Option<Config>,
    devel: Option<Config>,
}

impl Config {
    /// Loads configuration from the process environment and the usual file locations.
    ///
    /// # Errors
    /// Fails if a config file exists but cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, DbError> {
        Self::load_with(explicit, |k| std::env::var(k).ok())
    }

    /// Same as [`Config::load`] with a caller-supplied variable lookup.
    ///
    /// # Errors
    /// Fails if a config file exists but cannot be read or parsed.
    pub fn load_with(
        explicit: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DbError> {
        let env = Environment::from_lookup(&lookup);
        if let Some(p) = explicit
            && !p.exists()
        {
            return Err(DbError::Config(format!("config file not found: {}", p.display())));
        }
        let mut cfg = match candidate_paths(explicit, &lookup).into_iter().find(|p| p.exists()) {
            Some(path) => {
                log::info!("loading {env:?} config from {}", path.display());
                Self::from_file(&path, env)?
            }
            None => Self::default(),
        };
        if let Some(v) = lookup("LINCS_ADDRESS") {
            cfg.store.address = v;
        }
        if let Some(v) = lookup("LINCS_BUCKET") {
            cfg.store.bucket = v;
        }
        if let Some(v) = lookup("LINCS_PASSWORD") {
            cfg.store.password = Some(v);
        }
        Ok(cfg)
    }

    /// Reads the section for `env` from a TOML file; a missing section yields defaults.
    ///
    /// # Errors
    /// Fails on I/O or TOML errors.
    pub fn from_file(path: &Path, env: Environment) -> Result<Self, DbError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text, env)
    }

    /// # Errors
    /// Fails if `text` is not valid TOML for [`Config`].
    pub fn from_toml_str(text: &str, env: Environment) -> Result<Self, DbError> {
        let file: ConfigFile = toml::from_str(text)?;
        let section = match env {
            Environment::Prod => file.prod,
            Environment::Devel => file.devel,
        };
        Ok(section.unwrap_or_default())
    }
}

fn candidate_paths(
    explicit: Option<&Path>,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(p) = explicit {
        paths.push(p.to_path_buf());
    }
    if let Some(p) = lookup("LINCS_CONFIG") {
        paths.push(PathBuf::from(p));
    }
    if let Some(dir) = dirs_next::config_dir() {
        paths.push(dir.join("lincs.toml"));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join("lincs.toml"));
    }
    paths
}
