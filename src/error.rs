//! Error types for timer operations and durable storage

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned synchronously by Timer Store operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("Title cannot be empty")]
    InvalidTitle,

    #[error("Duration must be greater than 0")]
    InvalidDuration,

    #[error("Timer not found: {0}")]
    NotFound(String),
}

impl TimerError {
    /// Whether the caller supplied bad input (as opposed to a missing timer)
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidTitle | Self::InvalidDuration)
    }
}

/// Errors reading or writing the durable timer document
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored timers are corrupt")]
    Corrupt(#[source] serde_json::Error),

    #[error("failed to serialize timers")]
    Serialize(#[source] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
