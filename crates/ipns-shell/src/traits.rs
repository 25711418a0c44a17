use ipns_types::Cid;

use crate::error::ShellResult;
use crate::link::{BlockFormat, Link};

/// Client for the content-addressed store.
///
/// All implementations must satisfy these invariants:
/// - Nodes are immutable. [`patch_link`](Self::patch_link) never mutates
///   `root`; it returns the identifier of a new root node.
/// - A missing link anywhere along a path yields
///   [`ShellError::NotFound`](crate::ShellError::NotFound).
/// - Failures are returned as-is; retries, if any, happen inside the shell.
pub trait StorageShell {
    /// List the entries of the directory node at `path`.
    fn list(&self, path: &str) -> ShellResult<Vec<Link>>;

    /// Read the full content of the node at `path`.
    ///
    /// `path` may also be a bare identifier.
    fn cat(&self, path: &str) -> ShellResult<Vec<u8>>;

    /// Upload bytes as a file node and return its identifier.
    fn add(&self, data: &[u8]) -> ShellResult<Cid>;

    /// Attach `target` under `root` at the slash-separated `path`.
    ///
    /// With `create_intermediate`, missing directories along `path` are
    /// created empty. Returns the identifier of the new root.
    fn patch_link(
        &self,
        root: &Cid,
        path: &str,
        target: &Cid,
        create_intermediate: bool,
    ) -> ShellResult<Cid>;

    /// Store `data` as a raw block of `format` and return the identifier the
    /// store's canonical encoding derives for it.
    fn encode_raw_block(&self, data: &[u8], format: BlockFormat) -> ShellResult<Cid>;

    /// Identifier of an empty directory node, the root of a new remote.
    fn empty_directory(&self) -> ShellResult<Cid>;
}

impl<S: StorageShell + ?Sized> StorageShell for &S {
    fn list(&self, path: &str) -> ShellResult<Vec<Link>> {
        (**self).list(path)
    }

    fn cat(&self, path: &str) -> ShellResult<Vec<u8>> {
        (**self).cat(path)
    }

    fn add(&self, data: &[u8]) -> ShellResult<Cid> {
        (**self).add(data)
    }

    fn patch_link(
        &self,
        root: &Cid,
        path: &str,
        target: &Cid,
        create_intermediate: bool,
    ) -> ShellResult<Cid> {
        (**self).patch_link(root, path, target, create_intermediate)
    }

    fn encode_raw_block(&self, data: &[u8], format: BlockFormat) -> ShellResult<Cid> {
        (**self).encode_raw_block(data, format)
    }

    fn empty_directory(&self) -> ShellResult<Cid> {
        (**self).empty_directory()
    }
}
