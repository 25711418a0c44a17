/// Errors from storage-shell operations.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// No link with the requested name exists along the path.
    #[error("no link named {name:?} under {path}")]
    NotFound { path: String, name: String },

    /// A path segment resolved to something other than a directory.
    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    /// The path resolved to a node with no readable content.
    #[error("not a file: {path}")]
    NotAFile { path: String },

    /// The path could not be interpreted.
    #[error("invalid path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// Failure reported by the underlying store.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl ShellError {
    /// Returns `true` for the structured "link does not exist" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;
