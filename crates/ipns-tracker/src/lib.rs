//! Durable key-value tracker for the git-over-IPNS bridge.
//!
//! The tracker is the only bridge state that survives a process restart.
//! The bridge uses it for two things:
//!
//! - **Ref records**: ref name → raw object hash of the last pushed value.
//! - **Large-object ledger**: `//lobj/<object-cid>` → external content
//!   identifier, written *before* the matching tree patch so an interrupted
//!   publish can be repaired later.
//!
//! The bridge only ever calls `get`, `set` and `list_prefixed`; retention
//! belongs to the tracker.
//!
//! # Modules
//!
//! - [`error`] -- Error types for tracker operations
//! - [`traits`] -- The [`Tracker`] trait
//! - [`memory`] -- In-memory [`InMemoryTracker`] for tests
//! - [`file`] -- JSON-file backed [`FileTracker`]

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{Result, TrackerError};
pub use file::FileTracker;
pub use memory::InMemoryTracker;
pub use traits::Tracker;
