//! Error types for tracker operations.

use thiserror::Error;

/// Errors that can occur during tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A stored value could not be decoded.
    #[error("corrupt tracker entry {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A lock guarding tracker state was poisoned.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// I/O error during file-backed operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
