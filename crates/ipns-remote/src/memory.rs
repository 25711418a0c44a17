//! In-memory local repository for testing and embedding.
//!
//! [`InMemoryRepository`] holds raw git objects with explicit child edges and
//! implements both [`LocalRepository`] and [`ObjectPusher`], so a full push
//! can be driven without a git object database.

use std::collections::{BTreeMap, HashMap, HashSet};

use ipns_types::{to_content_id, ObjectHash};

use crate::error::{RemoteError, RemoteResult};
use crate::repo::{LocalRepository, ObjectPusher, ObjectVisitor};

/// Maximum symbolic-ref indirections followed before giving up.
const MAX_SYMREF_DEPTH: usize = 5;

#[derive(Clone, Debug)]
struct StoredObject {
    raw: Vec<u8>,
    children: Vec<ObjectHash>,
}

/// An in-memory implementation of [`LocalRepository`] and [`ObjectPusher`].
#[derive(Clone, Debug, Default)]
pub struct InMemoryRepository {
    refs: BTreeMap<String, ObjectHash>,
    symbolic: BTreeMap<String, String>,
    objects: HashMap<ObjectHash, StoredObject>,
}

impl InMemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` as a git object of `object_type` with the given
    /// children and return its hash.
    pub fn insert_object(
        &mut self,
        object_type: &str,
        content: &[u8],
        children: &[ObjectHash],
    ) -> ObjectHash {
        let (_, raw) = ObjectHash::of_typed(object_type, content);
        self.insert_raw(raw, children)
    }

    /// Store an already header-prefixed object and return its hash.
    pub fn insert_raw(&mut self, raw: Vec<u8>, children: &[ObjectHash]) -> ObjectHash {
        let hash = ObjectHash::of_raw(&raw);
        self.objects.insert(
            hash,
            StoredObject {
                raw,
                children: children.to_vec(),
            },
        );
        hash
    }

    /// Point a direct ref (e.g. `refs/heads/main`) at `hash`.
    pub fn set_ref(&mut self, name: impl Into<String>, hash: ObjectHash) {
        self.refs.insert(name.into(), hash);
    }

    /// Point a symbolic ref (e.g. `HEAD`) at another ref name.
    pub fn set_symbolic_ref(&mut self, name: impl Into<String>, target: impl Into<String>) {
        self.symbolic.insert(name.into(), target.into());
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

impl LocalRepository for InMemoryRepository {
    fn branches(&self) -> RemoteResult<Vec<(String, ObjectHash)>> {
        Ok(self
            .refs
            .iter()
            .filter(|(name, _)| name.starts_with("refs/heads/"))
            .map(|(name, hash)| (name.clone(), *hash))
            .collect())
    }

    fn resolve_reference(&self, name: &str) -> RemoteResult<ObjectHash> {
        let mut current = name;
        for _ in 0..=MAX_SYMREF_DEPTH {
            if let Some(hash) = self.refs.get(current) {
                return Ok(*hash);
            }
            match self.symbolic.get(current) {
                Some(target) => current = target.as_str(),
                None => {
                    return Err(RemoteError::RefResolution {
                        name: name.to_string(),
                        reason: format!("reference {current} not found"),
                    })
                }
            }
        }
        Err(RemoteError::RefResolution {
            name: name.to_string(),
            reason: format!("more than {MAX_SYMREF_DEPTH} symbolic indirections"),
        })
    }
}

impl ObjectPusher for InMemoryRepository {
    fn push_hash(&self, head: &ObjectHash, visit: &mut ObjectVisitor<'_>) -> RemoteResult<()> {
        let mut seen = HashSet::new();
        let mut stack = vec![*head];
        while let Some(hash) = stack.pop() {
            if !seen.insert(hash) {
                continue;
            }
            let object = self.objects.get(&hash).ok_or_else(|| {
                RemoteError::Push(format!("object {hash} missing from local repository"))
            })?;
            visit(&to_content_id(&hash)?, &object.raw)?;
            stack.extend(object.children.iter().rev().copied());
        }
        Ok(())
    }
}
