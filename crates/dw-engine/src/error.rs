//! Error types for the dw-engine service layer.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid config value: {what}")]
    InvalidConfig { what: String },

    #[error(transparent)]
    Core(#[from] dw_core::DwError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] dw_model::ModelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),
}

/// Result type for dw-engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
