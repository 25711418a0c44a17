use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The identifier could not be parsed, or it does not carry a digest this
    /// version-control system can use.
    #[error("malformed identifier {identifier}: {reason}")]
    MalformedIdentifier { identifier: String, reason: String },
}
