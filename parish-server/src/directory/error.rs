//! Directory error types

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading or writing the persisted collection
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed directory document {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Format {
            path: path.into(),
            source,
        }
    }
}

/// Directory Store errors
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// One or more fields failed validation; nothing was persisted
    #[error("Validation failed: {message}")]
    Validation { fields: Vec<String>, message: String },

    #[error("Member {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl DirectoryError {
    /// Offending field names (empty unless this is a validation error)
    pub fn fields(&self) -> &[String] {
        match self {
            Self::Validation { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for directory operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;
