use std::path::PathBuf;

use crate::validate::ValidationError;

/// Unified error type for all pixmeta operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Malformed {field}: {reason}")]
    MalformedMetadata { field: String, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
