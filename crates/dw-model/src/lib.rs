//! dw-model: entity schema, snapshot file format and validation.

pub mod schema;
pub mod snapshot;
pub mod validate;

pub use schema::*;
pub use snapshot::EntitySnapshot;
pub use validate::{LATEST_VERSION, ValidationError, validate_snapshot};

use std::path::{Path, PathBuf};

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to read snapshot file: {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write snapshot file: {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported snapshot format: {path} (expected .yaml, .yml or .json)")]
    UnsupportedFormat { path: PathBuf },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Copy)]
enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> ModelResult<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => Err(ModelError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load and validate a snapshot document, picking the format by extension.
pub fn load_snapshot_file(path: &Path) -> ModelResult<SnapshotFile> {
    let format = format_of(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: SnapshotFile = match format {
        Format::Yaml => serde_yaml::from_str(&content)?,
        Format::Json => serde_json::from_str(&content)?,
    };
    validate_snapshot(&file)?;
    Ok(file)
}

/// Load a snapshot document and index its entities.
pub fn load_snapshot(path: &Path) -> ModelResult<EntitySnapshot> {
    let file = load_snapshot_file(path)?;
    Ok(EntitySnapshot::from_entities(file.entities))
}

pub fn save_snapshot_file(path: &Path, file: &SnapshotFile) -> ModelResult<()> {
    validate_snapshot(file)?;
    let content = match format_of(path)? {
        Format::Yaml => serde_yaml::to_string(file)?,
        Format::Json => serde_json::to_string_pretty(file)?,
    };
    std::fs::write(path, content).map_err(|source| ModelError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_snapshot(path: &Path, snapshot: &EntitySnapshot) -> ModelResult<()> {
    let file = SnapshotFile {
        version: LATEST_VERSION,
        name: None,
        entities: snapshot.iter().cloned().collect(),
    };
    save_snapshot_file(path, &file)
}
