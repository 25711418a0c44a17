use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use cid::multihash::Multihash;
use ipns_types::{Cid, ObjectHash, SHA1_MULTIHASH};

use crate::error::{ShellError, ShellResult};
use crate::link::{BlockFormat, Link, LinkKind};
use crate::path;
use crate::traits::StorageShell;

/// Multicodec code for raw file content.
const RAW_CODEC: u64 = 0x55;
/// Multicodec code for directory nodes.
const DAG_PB_CODEC: u64 = 0x70;
/// Multihash code for BLAKE3.
const BLAKE3_MULTIHASH: u64 = 0x1e;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Node {
    Directory(BTreeMap<String, Cid>),
    File(Vec<u8>),
    Block(Vec<u8>),
}

/// In-memory, HashMap-based storage shell.
///
/// Intended for tests and embedding. Files and directories are addressed by
/// BLAKE3; git blocks are addressed by SHA-1 under the `git-raw` codec, the
/// same identifiers the translator produces. Links to identifiers the shell
/// has never stored list as [`LinkKind::Unknown`].
pub struct InMemoryShell {
    nodes: RwLock<HashMap<Cid, Node>>,
}

impl InMemoryShell {
    /// Create a new empty shell.
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
        }
    }

    /// Number of nodes currently stored.
    pub fn len(&self) -> usize {
        self.nodes.read().map(|n| n.len()).unwrap_or(0)
    }

    /// Returns `true` if no node is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if a node with this identifier is stored.
    pub fn contains(&self, cid: &Cid) -> bool {
        self.nodes
            .read()
            .map(|n| n.contains_key(cid))
            .unwrap_or(false)
    }

    /// Overwrite the bytes stored under an existing file or block identifier
    /// without re-addressing it, simulating corruption in the store.
    ///
    /// Returns `false` if no file or block is stored under `cid`.
    pub fn tamper(&self, cid: &Cid, data: Vec<u8>) -> bool {
        let Ok(mut nodes) = self.nodes.write() else {
            return false;
        };
        match nodes.get_mut(cid) {
            Some(Node::File(bytes)) | Some(Node::Block(bytes)) => {
                *bytes = data;
                true
            }
            _ => false,
        }
    }

    fn read_nodes(&self) -> ShellResult<RwLockReadGuard<'_, HashMap<Cid, Node>>> {
        self.nodes
            .read()
            .map_err(|e| ShellError::Backend(format!("lock poisoned: {e}")))
    }

    fn write_nodes(&self) -> ShellResult<RwLockWriteGuard<'_, HashMap<Cid, Node>>> {
        self.nodes
            .write()
            .map_err(|e| ShellError::Backend(format!("lock poisoned: {e}")))
    }

    fn resolve<'a>(nodes: &'a HashMap<Cid, Node>, full: &str) -> ShellResult<&'a Node> {
        let (root, segments) = path::split(full)?;
        let mut walked = root.to_string();
        let mut node = nodes.get(&root).ok_or_else(|| ShellError::NotFound {
            path: full.to_string(),
            name: root.to_string(),
        })?;
        for segment in segments {
            let Node::Directory(entries) = node else {
                return Err(ShellError::NotADirectory { path: walked });
            };
            let child = entries.get(segment).ok_or_else(|| ShellError::NotFound {
                path: walked.clone(),
                name: segment.to_string(),
            })?;
            node = nodes.get(child).ok_or_else(|| ShellError::NotFound {
                path: walked.clone(),
                name: segment.to_string(),
            })?;
            walked.push('/');
            walked.push_str(segment);
        }
        Ok(node)
    }

    fn insert_directory(
        nodes: &mut HashMap<Cid, Node>,
        entries: BTreeMap<String, Cid>,
    ) -> ShellResult<Cid> {
        let mut hasher = blake3::Hasher::new();
        for (name, cid) in &entries {
            hasher.update(name.as_bytes());
            hasher.update(b"\0");
            hasher.update(&cid.to_bytes());
            hasher.update(b"\n");
        }
        let cid = blake3_cid(DAG_PB_CODEC, hasher.finalize().as_bytes())?;
        nodes.entry(cid).or_insert(Node::Directory(entries));
        Ok(cid)
    }

    fn patch_directory(
        nodes: &mut HashMap<Cid, Node>,
        dir: &Cid,
        segments: &[&str],
        target: &Cid,
        create_intermediate: bool,
        walked: &str,
    ) -> ShellResult<Cid> {
        let mut entries = match nodes.get(dir) {
            Some(Node::Directory(entries)) => entries.clone(),
            Some(_) => {
                return Err(ShellError::NotADirectory {
                    path: walked.to_string(),
                })
            }
            None => {
                return Err(ShellError::NotFound {
                    path: walked.to_string(),
                    name: dir.to_string(),
                })
            }
        };

        let Some((name, rest)) = segments.split_first() else {
            return Err(ShellError::InvalidPath {
                path: walked.to_string(),
                reason: "empty link path".into(),
            });
        };

        let replacement = if rest.is_empty() {
            *target
        } else {
            let child = match entries.get(*name) {
                Some(child) => *child,
                None if create_intermediate => Self::insert_directory(nodes, BTreeMap::new())?,
                None => {
                    return Err(ShellError::NotFound {
                        path: walked.to_string(),
                        name: (*name).to_string(),
                    })
                }
            };
            let below = format!("{walked}/{name}");
            Self::patch_directory(nodes, &child, rest, target, create_intermediate, &below)?
        };

        entries.insert((*name).to_string(), replacement);
        Self::insert_directory(nodes, entries)
    }
}

impl Default for InMemoryShell {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageShell for InMemoryShell {
    fn list(&self, full: &str) -> ShellResult<Vec<Link>> {
        let nodes = self.read_nodes()?;
        let Node::Directory(entries) = Self::resolve(&nodes, full)? else {
            return Err(ShellError::NotADirectory {
                path: full.to_string(),
            });
        };
        Ok(entries
            .iter()
            .map(|(name, cid)| {
                let kind = match nodes.get(cid) {
                    Some(Node::Directory(_)) => LinkKind::Directory,
                    Some(Node::File(_)) => LinkKind::File,
                    Some(Node::Block(_)) | None => LinkKind::Unknown,
                };
                Link::new(name.clone(), kind, *cid)
            })
            .collect())
    }

    fn cat(&self, full: &str) -> ShellResult<Vec<u8>> {
        let nodes = self.read_nodes()?;
        match Self::resolve(&nodes, full)? {
            Node::File(bytes) | Node::Block(bytes) => Ok(bytes.clone()),
            Node::Directory(_) => Err(ShellError::NotAFile {
                path: full.to_string(),
            }),
        }
    }

    fn add(&self, data: &[u8]) -> ShellResult<Cid> {
        let cid = blake3_cid(RAW_CODEC, blake3::hash(data).as_bytes())?;
        self.write_nodes()?
            .entry(cid)
            .or_insert_with(|| Node::File(data.to_vec()));
        tracing::trace!(%cid, size = data.len(), "added file node");
        Ok(cid)
    }

    fn patch_link(
        &self,
        root: &Cid,
        link_path: &str,
        target: &Cid,
        create_intermediate: bool,
    ) -> ShellResult<Cid> {
        let segments: Vec<&str> = path::segments(link_path).collect();
        let mut nodes = self.write_nodes()?;
        Self::patch_directory(
            &mut nodes,
            root,
            &segments,
            target,
            create_intermediate,
            &root.to_string(),
        )
    }

    fn encode_raw_block(&self, data: &[u8], format: BlockFormat) -> ShellResult<Cid> {
        let cid = match format {
            BlockFormat::Git => {
                let hash = ObjectHash::of_raw(data);
                let multihash = Multihash::<64>::wrap(SHA1_MULTIHASH, hash.as_bytes())
                    .map_err(|e| ShellError::Backend(e.to_string()))?;
                Cid::new_v1(format.codec(), multihash)
            }
        };
        self.write_nodes()?
            .entry(cid)
            .or_insert_with(|| Node::Block(data.to_vec()));
        Ok(cid)
    }

    fn empty_directory(&self) -> ShellResult<Cid> {
        let mut nodes = self.write_nodes()?;
        Self::insert_directory(&mut nodes, BTreeMap::new())
    }
}

impl std::fmt::Debug for InMemoryShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryShell")
            .field("node_count", &self.len())
            .finish()
    }
}

fn blake3_cid(codec: u64, digest: &[u8; 32]) -> ShellResult<Cid> {
    let multihash = Multihash::<64>::wrap(BLAKE3_MULTIHASH, digest)
        .map_err(|e| ShellError::Backend(e.to_string()))?;
    Ok(Cid::new_v1(codec, multihash))
}
