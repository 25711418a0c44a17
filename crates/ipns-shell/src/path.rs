//! Store path helpers.
//!
//! A store path names a node by walking links from a root identifier:
//! `<root-cid>/refs/heads/main`. The `/ipfs/` prefix is accepted and ignored.

use ipns_types::{parse_content_id, Cid};

use crate::error::{ShellError, ShellResult};

const IPFS_PREFIX: &str = "/ipfs/";

/// Join a relative, slash-separated path onto a root identifier.
///
/// Empty segments are dropped, so `join(root, "")` names the root itself.
pub fn join(root: &Cid, relative: &str) -> String {
    let mut out = root.to_string();
    for segment in segments(relative) {
        out.push('/');
        out.push_str(segment);
    }
    out
}

/// Non-empty segments of a slash-separated path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Split a store path into its root identifier and the link names below it.
pub fn split(path: &str) -> ShellResult<(Cid, Vec<&str>)> {
    let trimmed = path.strip_prefix(IPFS_PREFIX).unwrap_or(path);
    let mut parts = segments(trimmed);
    let root = parts.next().ok_or_else(|| ShellError::InvalidPath {
        path: path.to_string(),
        reason: "missing root identifier".into(),
    })?;
    let root = parse_content_id(root).map_err(|e| ShellError::InvalidPath {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok((root, parts.collect()))
}
