//! Error types for bioscore

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BioscoreError {
    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("Failed to parse index catalog {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    // Catalog and generation errors
    #[error("Index not found in catalog: {key}")]
    IndexNotFound { key: String },

    #[error("Failed to generate dataset for index '{index}': {reason}")]
    Generation { index: String, reason: String },

    #[error("Band '{band}' missing from reduction output of index '{index}'")]
    BandMissing { index: String, band: String },

    // Project errors
    #[error("No stored geometry for project: {name}")]
    ProjectNotFound { name: String },

    #[error("Invalid region of interest: {reason}")]
    InvalidRegion { reason: String },

    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    // Collaborator errors
    #[error("Earth Engine authentication failed: {0}")]
    Authentication(String),

    #[error("Earth Engine call failed: {0}")]
    RemoteCall(String),

    #[error("Warehouse error: {0}")]
    Warehouse(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, BioscoreError>;
