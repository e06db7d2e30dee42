//! Core error types for momentum-core.
//!
//! Business-rule rejections that are part of normal operation (for example
//! claiming a reward without enough points) are *not* errors; they are
//! returned as outcome values by the owning component.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for momentum-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input rejected before any state changed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Operation addressed an id that does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// State machine transition not allowed from the current state
    #[error("Invalid state: {0}")]
    InvalidState(#[from] InvalidStateError),

    /// Persistence-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title was empty after trimming
    #[error("Title must not be empty")]
    EmptyTitle,

    /// A quantity that must be strictly positive was zero
    #[error("'{field}' must be a positive integer")]
    NonPositive { field: &'static str },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Rejected state machine transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {operation} while {state}")]
pub struct InvalidStateError {
    pub operation: &'static str,
    pub state: &'static str,
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// Stored value could not be encoded or decoded
    #[error("Malformed value for key '{key}': {source}")]
    Codec {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[source] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Dot-path key does not name a config field
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Value could not be parsed for the key's type
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
