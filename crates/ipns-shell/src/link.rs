use std::fmt;

use ipns_types::{Cid, GIT_RAW_CODEC};

/// Node type reported for a directory entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// A file node with readable content.
    File,
    /// A directory node that can be listed.
    Directory,
    /// A node the store cannot classify (foreign codecs such as `git-raw`).
    Unknown,
    /// Any other store-specific node type, by its numeric tag.
    Other(i32),
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
            Self::Unknown => write!(f, "unknown"),
            Self::Other(tag) => write!(f, "type {tag}"),
        }
    }
}

/// A named entry of a directory node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    /// Entry name within its parent directory.
    pub name: String,
    /// Node type as reported by the store.
    pub kind: LinkKind,
    /// Content identifier of the linked node.
    pub cid: Cid,
}

impl Link {
    /// Create a new link.
    pub fn new(name: impl Into<String>, kind: LinkKind, cid: Cid) -> Self {
        Self {
            name: name.into(),
            kind,
            cid,
        }
    }
}

/// Block encodings the shell can derive a canonical identifier for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockFormat {
    /// A raw, header-prefixed git object.
    Git,
}

impl BlockFormat {
    /// Multicodec code of identifiers produced for this format.
    pub fn codec(&self) -> u64 {
        match self {
            Self::Git => GIT_RAW_CODEC,
        }
    }
}

impl fmt::Display for BlockFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
        }
    }
}
