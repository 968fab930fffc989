//! Store error types.
//!
//! File operations return structured errors with user-facing messages.
//! At the backend boundary they become [`BackendError::Storage`].

use std::path::PathBuf;

use tabula_model::BackendError;
use thiserror::Error;

/// Failure reading or writing a table file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// File I/O error.
    #[error("failed to {operation} {path}")]
    Io {
        /// What was being done ("read", "create", "write", "sync").
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid table JSON.
    #[error("invalid table file {path}")]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the tables failed.
    #[error("failed to serialize tables")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// The file was written by a newer format version.
    #[error("table file version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion {
        found: u32,
        max_supported: u32,
        path: PathBuf,
    },

    /// The temp file could not be renamed over the target.
    #[error("failed to replace {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The blocking I/O task did not complete.
    #[error("background file task failed")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl StoreError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {} the file at {}.", operation, path.display()),
            Self::InvalidFormat { path, .. } => {
                format!("The file at {} is not a valid table file.", path.display())
            }
            Self::Serialization { .. } => "The tables could not be encoded.".to_string(),
            Self::UnsupportedVersion {
                found,
                max_supported,
                ..
            } => format!(
                "This table file was written by a newer version (file version {found}, \
                 supported up to {max_supported}). Please update Tabula."
            ),
            Self::AtomicWriteFailed { target_path, .. } => format!(
                "Could not save the file to {}. Please check disk space and permissions.",
                target_path.display()
            ),
            Self::Task { .. } => "The save was interrupted.".to_string(),
        }
    }
}

impl From<StoreError> for BackendError {
    fn from(error: StoreError) -> Self {
        BackendError::Storage(error.user_message())
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
