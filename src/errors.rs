use crate::document::ValidationReport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Validation error: {0}")]
    Validation(ValidationReport),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl DbError {
    /// True for errors raised before any store request was issued.
    #[must_use]
    pub const fn is_client_side(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidFilter(_) | Self::Config(_))
    }
}
