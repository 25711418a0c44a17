//! Interfaces to the local git side of the bridge.
//!
//! The bridge does not read git's object database itself. It asks a
//! [`LocalRepository`] for ref values, and hands the graph walk to an
//! [`ObjectPusher`] that reports every object it visits.

use ipns_types::{Cid, ObjectHash};

use crate::error::RemoteResult;

/// Callback invoked once per object visited during a push walk.
///
/// Receives the object's content identifier and its raw, header-prefixed
/// bytes. Returning an error aborts the walk.
pub type ObjectVisitor<'a> = dyn FnMut(&Cid, &[u8]) -> RemoteResult<()> + 'a;

/// Read access to the local repository's references.
pub trait LocalRepository {
    /// All local branches as `(canonical name, tip hash)`.
    fn branches(&self) -> RemoteResult<Vec<(String, ObjectHash)>>;

    /// Resolve a reference, following symbolic refs, to the hash it names.
    ///
    /// Fails with [`RemoteError::RefResolution`](crate::RemoteError::RefResolution)
    /// if the reference is missing or malformed.
    fn resolve_reference(&self, name: &str) -> RemoteResult<ObjectHash>;
}

/// Push negotiation: walks the object graph below a head.
pub trait ObjectPusher {
    /// Walk every object reachable from `head`, calling `visit` for each.
    fn push_hash(&self, head: &ObjectHash, visit: &mut ObjectVisitor<'_>) -> RemoteResult<()>;
}
