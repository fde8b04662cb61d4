//! Storage error types
//!
//! Defines all errors that can occur in the availability store.

use thiserror::Error;

/// Errors that can occur in the availability store
#[derive(Error, Debug)]
pub enum StorageError {
    /// A resolution token could not be parsed, or the zero resolution was used
    #[error("Undefined resolution")]
    UndefinedResolution,

    /// Storage resolution does not divide a day into whole units
    #[error("Invalid storage resolution: {0} does not divide a day evenly")]
    InvalidStorageResolution(String),

    /// Requested resolution is neither a multiple nor a divisor of the storage resolution
    #[error("Incompatible resolution: {requested} cannot be derived from storage resolution {storage}")]
    IncompatibleResolution { requested: String, storage: String },

    /// I/O operation failed (snapshots)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed (snapshots)
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
