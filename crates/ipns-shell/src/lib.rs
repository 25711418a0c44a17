//! Storage-shell interface for the git-over-IPNS bridge.
//!
//! The bridge never talks to the distributed store directly. Every read,
//! upload and tree mutation goes through a [`StorageShell`], which exposes
//! the handful of node operations the bridge needs: list a directory, cat a
//! leaf, add bytes, patch a link into a tree, and encode a raw block.
//!
//! # Backends
//!
//! - [`InMemoryShell`] -- `HashMap`-backed node store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Nodes are immutable; every patch produces a brand-new root.
//! 2. A missing link is reported as [`ShellError::NotFound`], never as an
//!    opaque message.
//! 3. Paths are `<root-cid>/<segment>/...`, optionally prefixed by `/ipfs/`.

pub mod error;
pub mod link;
pub mod memory;
pub mod path;
pub mod traits;

pub use error::{ShellError, ShellResult};
pub use link::{BlockFormat, Link, LinkKind};
pub use memory::InMemoryShell;
pub use path::join;
pub use traits::StorageShell;
