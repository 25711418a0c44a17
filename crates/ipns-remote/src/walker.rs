//! Discovery of refs inside the published tree.
//!
//! The root tree mirrors git's ref namespace: `refs/heads/main` is a link
//! path, `HEAD` is a small text file, and every intermediate segment is a
//! directory. The top-level `objects` directory belongs to the large-object
//! index and is never interpreted as refs.

use ipns_shell::{join, Link, LinkKind, StorageShell};
use ipns_types::Cid;

use crate::error::{RemoteError, RemoteResult};

/// Kind of ref found in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefKind {
    /// Leaf linking to a git object; the link's identifier is the tip.
    Head,
    /// Text leaf naming another ref.
    Symbolic,
}

/// A ref discovered by the walker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefEntry {
    /// Ref path relative to the root, e.g. `refs/heads/main`.
    pub path: String,
    pub kind: RefKind,
    /// Identifier the leaf links to.
    pub cid: Cid,
}

/// Interpretation of a single directory entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryClass {
    HeadRef,
    SymbolicRef,
    Directory,
    Unrecognized(LinkKind),
}

/// Classify a link by the node type the store reports.
///
/// Nodes the store cannot type are git objects (foreign codec), hence
/// head refs.
pub fn classify(link: &Link) -> EntryClass {
    match link.kind {
        LinkKind::Directory => EntryClass::Directory,
        LinkKind::File => EntryClass::SymbolicRef,
        LinkKind::Unknown => EntryClass::HeadRef,
        other @ LinkKind::Other(_) => EntryClass::Unrecognized(other),
    }
}

/// Depth-first walker over the ref tree.
pub struct RefTreeWalker<'a, S: ?Sized> {
    shell: &'a S,
    reserved: &'a str,
}

impl<'a, S: StorageShell + ?Sized> RefTreeWalker<'a, S> {
    /// Create a walker that skips the top-level `reserved` entry.
    pub fn new(shell: &'a S, reserved: &'a str) -> Self {
        Self { shell, reserved }
    }

    /// Collect every ref below `root`.
    ///
    /// Entries are grouped by directory, depth first, in the order the
    /// store lists them. Listing failures are returned as-is.
    pub fn walk(&self, root: &Cid) -> RemoteResult<Vec<RefEntry>> {
        let mut out = Vec::new();
        self.walk_dir(root, "", 0, &mut out)?;
        Ok(out)
    }

    fn walk_dir(
        &self,
        root: &Cid,
        prefix: &str,
        depth: usize,
        out: &mut Vec<RefEntry>,
    ) -> RemoteResult<()> {
        let path = join(root, prefix);
        let links = self
            .shell
            .list(&path)
            .map_err(|source| RemoteError::Listing {
                path: path.clone(),
                source,
            })?;

        for link in links {
            if depth == 0 && link.name == self.reserved {
                continue;
            }
            let rel = if prefix.is_empty() {
                link.name.clone()
            } else {
                format!("{prefix}/{}", link.name)
            };
            match classify(&link) {
                EntryClass::Directory => self.walk_dir(root, &rel, depth + 1, out)?,
                EntryClass::HeadRef => out.push(RefEntry {
                    path: rel,
                    kind: RefKind::Head,
                    cid: link.cid,
                }),
                EntryClass::SymbolicRef => out.push(RefEntry {
                    path: rel,
                    kind: RefKind::Symbolic,
                    cid: link.cid,
                }),
                EntryClass::Unrecognized(kind) => {
                    return Err(RemoteError::UnexpectedLinkType { path: rel, kind })
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipns_shell::{BlockFormat, InMemoryShell, ShellError, ShellResult};
    use ipns_types::{to_content_id, ObjectHash};

    fn git_cid(content: &[u8]) -> Cid {
        to_content_id(&ObjectHash::of_typed("commit", content).0).unwrap()
    }

    fn build(shell: &InMemoryShell, links: &[(&str, Cid)]) -> Cid {
        let mut root = shell.empty_directory().unwrap();
        for (path, target) in links {
            root = shell.patch_link(&root, path, target, true).unwrap();
        }
        root
    }

    /// Shell whose root lists a single link of a fixed kind.
    struct FixedShell(Link);

    impl StorageShell for FixedShell {
        fn list(&self, _path: &str) -> ShellResult<Vec<Link>> {
            Ok(vec![self.0.clone()])
        }
        fn cat(&self, path: &str) -> ShellResult<Vec<u8>> {
            Err(ShellError::NotAFile { path: path.into() })
        }
        fn add(&self, _data: &[u8]) -> ShellResult<Cid> {
            Err(ShellError::Backend("read-only".into()))
        }
        fn patch_link(&self, _: &Cid, _: &str, _: &Cid, _: bool) -> ShellResult<Cid> {
            Err(ShellError::Backend("read-only".into()))
        }
        fn encode_raw_block(&self, _: &[u8], _: BlockFormat) -> ShellResult<Cid> {
            Err(ShellError::Backend("read-only".into()))
        }
        fn empty_directory(&self) -> ShellResult<Cid> {
            Err(ShellError::Backend("read-only".into()))
        }
    }

    #[test]
    fn classify_follows_store_types() {
        let cid = git_cid(b"x");
        assert_eq!(
            classify(&Link::new("d", LinkKind::Directory, cid)),
            EntryClass::Directory
        );
        assert_eq!(
            classify(&Link::new("HEAD", LinkKind::File, cid)),
            EntryClass::SymbolicRef
        );
        assert_eq!(
            classify(&Link::new("main", LinkKind::Unknown, cid)),
            EntryClass::HeadRef
        );
        assert_eq!(
            classify(&Link::new("odd", LinkKind::Other(4), cid)),
            EntryClass::Unrecognized(LinkKind::Other(4))
        );
    }

    #[test]
    fn walks_heads_and_symbolic_refs() {
        let shell = InMemoryShell::new();
        let head_text = shell.add(b"refs/heads/main").unwrap();
        let main = git_cid(b"main");
        let dev = git_cid(b"dev");
        let root = build(
            &shell,
            &[
                ("refs/heads/main", main),
                ("refs/heads/feature/dev", dev),
                ("HEAD", head_text),
            ],
        );

        let entries = RefTreeWalker::new(&shell, "objects").walk(&root).unwrap();
        assert_eq!(
            entries,
            vec![
                RefEntry {
                    path: "HEAD".into(),
                    kind: RefKind::Symbolic,
                    cid: head_text
                },
                RefEntry {
                    path: "refs/heads/feature/dev".into(),
                    kind: RefKind::Head,
                    cid: dev
                },
                RefEntry {
                    path: "refs/heads/main".into(),
                    kind: RefKind::Head,
                    cid: main
                },
            ]
        );
    }

    #[test]
    fn top_level_objects_directory_is_skipped() {
        let shell = InMemoryShell::new();
        let blob = shell.add(b"large").unwrap();
        let root = build(
            &shell,
            &[
                ("objects/bafyobject", blob),
                ("refs/heads/main", git_cid(b"m")),
            ],
        );
        let entries = RefTreeWalker::new(&shell, "objects").walk(&root).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.iter().all(|e| !e.path.starts_with("objects")));
    }

    #[test]
    fn nested_objects_directory_is_walked() {
        let shell = InMemoryShell::new();
        let tip = git_cid(b"nested");
        let root = build(&shell, &[("refs/objects/tip", tip)]);
        let entries = RefTreeWalker::new(&shell, "objects").walk(&root).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "refs/objects/tip");
        assert_eq!(entries[0].kind, RefKind::Head);
    }

    #[test]
    fn empty_root_has_no_refs() {
        let shell = InMemoryShell::new();
        let root = shell.empty_directory().unwrap();
        assert!(RefTreeWalker::new(&shell, "objects")
            .walk(&root)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn unrecognized_link_type_fails() {
        let shell = FixedShell(Link::new("weird", LinkKind::Other(7), git_cid(b"w")));
        let err = RefTreeWalker::new(&shell, "objects")
            .walk(&git_cid(b"root"))
            .unwrap_err();
        match err {
            RemoteError::UnexpectedLinkType { path, kind } => {
                assert_eq!(path, "weird");
                assert_eq!(kind, LinkKind::Other(7));
            }
            other => panic!("expected UnexpectedLinkType, got {other:?}"),
        }
    }

    #[test]
    fn listing_failure_propagates() {
        let shell = InMemoryShell::new();
        let missing = git_cid(b"never stored");
        let err = RefTreeWalker::new(&shell, "objects")
            .walk(&missing)
            .unwrap_err();
        match err {
            RemoteError::Listing { source, .. } => assert!(source.is_not_found()),
            other => panic!("expected Listing, got {other:?}"),
        }
    }
}
