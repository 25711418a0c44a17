//! Synchronization core of the git-over-IPNS remote helper.
//!
//! A [`Session`] answers git's remote-helper requests against a published
//! root tree: it lists refs, serves oversized objects from the large-object
//! index, pushes local refs and, on finish, repairs the index from the
//! recovery ledger before reporting the new root.
//!
//! The session depends on three collaborators, each behind a trait:
//!
//! - [`ipns_shell::StorageShell`] -- the content-addressed store
//! - [`ipns_tracker::Tracker`] -- durable key-value ledger
//! - [`LocalRepository`] / [`ObjectPusher`] -- the local git repository
//!
//! [`InMemoryRepository`] stands in for a real repository in tests.

pub mod config;
pub mod error;
pub mod lobj;
pub mod memory;
pub mod patch;
pub mod repo;
pub mod session;
pub mod walker;

pub use config::BridgeConfig;
pub use error::{RemoteError, RemoteResult};
pub use lobj::LargeObjectIndex;
pub use memory::InMemoryRepository;
pub use patch::{patch, PatchSequencer};
pub use repo::{LocalRepository, ObjectPusher, ObjectVisitor};
pub use session::{Published, Session, SessionState};
pub use walker::{classify, EntryClass, RefEntry, RefKind, RefTreeWalker};
