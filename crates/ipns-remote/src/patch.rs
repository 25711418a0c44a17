//! Sequential mutation of the published root.
//!
//! The store computes a fresh tree snapshot for every patch, so two patches
//! computed from the same root would each drop the other's change. The
//! [`PatchSequencer`] owns the root and feeds each result into the next
//! patch; `&mut self` keeps that ordering at compile time.

use ipns_shell::StorageShell;
use ipns_types::Cid;
use tracing::debug;

use crate::error::{RemoteError, RemoteResult};

/// Attach `target` at `path` below `root`, returning the new root.
pub fn patch<S: StorageShell + ?Sized>(
    shell: &S,
    root: &Cid,
    path: &str,
    target: &Cid,
    create_intermediate: bool,
) -> RemoteResult<Cid> {
    shell
        .patch_link(root, path, target, create_intermediate)
        .map_err(|source| RemoteError::Patch {
            path: path.to_string(),
            source,
        })
}

/// Owner of the session's current root identifier.
///
/// The root only moves forward. A failed patch leaves it where the last
/// successful one put it; there is no undo.
#[derive(Clone, Debug)]
pub struct PatchSequencer {
    root: Cid,
    applied: usize,
}

impl PatchSequencer {
    pub fn new(root: Cid) -> Self {
        Self { root, applied: 0 }
    }

    /// The latest root.
    pub fn root(&self) -> &Cid {
        &self.root
    }

    /// Number of patches applied so far.
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Patch `target` in at `path`, creating missing directories, and
    /// advance the root.
    pub fn apply<S: StorageShell + ?Sized>(
        &mut self,
        shell: &S,
        path: &str,
        target: &Cid,
    ) -> RemoteResult<Cid> {
        let next = patch(shell, &self.root, path, target, true)?;
        debug!(path, %target, from = %self.root, to = %next, "patched root");
        self.root = next;
        self.applied += 1;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipns_shell::{join, InMemoryShell};

    #[test]
    fn each_patch_builds_on_the_last() {
        let shell = InMemoryShell::new();
        let root = shell.empty_directory().unwrap();
        let mut seq = PatchSequencer::new(root);

        let a = shell.add(b"a").unwrap();
        let b = shell.add(b"b").unwrap();
        seq.apply(&shell, "refs/heads/a", &a).unwrap();
        seq.apply(&shell, "refs/heads/b", &b).unwrap();

        let heads = shell.list(&join(seq.root(), "refs/heads")).unwrap();
        let names: Vec<_> = heads.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(seq.applied(), 2);
    }

    #[test]
    fn patching_a_stale_root_loses_changes() {
        let shell = InMemoryShell::new();
        let root = shell.empty_directory().unwrap();
        let a = shell.add(b"a").unwrap();
        let b = shell.add(b"b").unwrap();

        let _first = patch(&shell, &root, "a", &a, true).unwrap();
        let second = patch(&shell, &root, "b", &b, true).unwrap();
        let names: Vec<_> = shell
            .list(&second.to_string())
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["b".to_string()]);
    }

    #[test]
    fn failed_patch_keeps_root() {
        let shell = InMemoryShell::new();
        let file = shell.add(b"not a dir").unwrap();
        let mut seq = PatchSequencer::new(file);
        let err = seq.apply(&shell, "x", &file).unwrap_err();
        assert!(matches!(err, RemoteError::Patch { .. }));
        assert_eq!(seq.root(), &file);
        assert_eq!(seq.applied(), 0);
    }
}
