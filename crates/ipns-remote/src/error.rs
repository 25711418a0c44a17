use ipns_shell::{LinkKind, ShellError};
use ipns_tracker::TrackerError;
use ipns_types::{Cid, TypeError};
use thiserror::Error;

/// Errors surfaced by list, push, fetch and finish operations.
///
/// Every variant carries the offending path or identifier. Shell failures
/// are passed through untouched; nothing here is retried.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("malformed identifier: {0}")]
    MalformedIdentifier(#[from] TypeError),

    /// The object is not in the large-object index; try another source.
    #[error("object {object} is not provided by this remote")]
    NotProvided { object: Cid },

    /// Fetched content derives a different identifier than requested.
    #[error("integrity mismatch for {requested}: fetched content derives {derived}")]
    IntegrityMismatch { requested: Cid, derived: Cid },

    #[error("listing {path} failed: {source}")]
    Listing { path: String, source: ShellError },

    #[error("fetching {path} failed: {source}")]
    Fetch { path: String, source: ShellError },

    #[error("patching {path} failed: {source}")]
    Patch { path: String, source: ShellError },

    #[error("upload failed: {source}")]
    Upload { source: ShellError },

    #[error("encoding raw block failed: {source}")]
    Encode { source: ShellError },

    #[error("creating empty root failed: {source}")]
    Root { source: ShellError },

    #[error("symbolic ref at {path} is not valid UTF-8: {source}")]
    InvalidSymbolicRef {
        path: String,
        source: std::string::FromUtf8Error,
    },

    #[error("unexpected link type {kind} at {path}")]
    UnexpectedLinkType { path: String, kind: LinkKind },

    #[error("cannot resolve ref {name}: {reason}")]
    RefResolution { name: String, reason: String },

    #[error("push failed: {0}")]
    Push(String),

    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("session already finished")]
    SessionFinished,
}

impl RemoteError {
    /// Returns `true` if the caller should fetch the object elsewhere.
    pub fn is_not_provided(&self) -> bool {
        matches!(self, Self::NotProvided { .. })
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;
