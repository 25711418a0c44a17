//! JSON-file backed tracker.
//!
//! On-disk format is a single JSON object mapping each key to its
//! hex-encoded value:
//!
//! ```text
//! {"//lobj/bafy...": "6261667...", "refs/heads/main": "1f2e..."}
//! ```
//!
//! Every `set` rewrites the file through a temporary sibling that is synced
//! and then renamed over the original, so a crash leaves either the old or
//! the new ledger on disk, never a torn one.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::traits::Tracker;

/// A durable [`Tracker`] persisted as a JSON file.
#[derive(Debug)]
pub struct FileTracker {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl FileTracker {
    /// Open the tracker stored at `path`.
    ///
    /// A missing file is an empty tracker; it is created on the first `set`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read(&path) {
            Ok(bytes) => decode(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = entries.len(), "opened tracker");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, Vec<u8>>) -> Result<()> {
        let encoded: BTreeMap<&str, String> = entries
            .iter()
            .map(|(k, v)| (k.as_str(), hex::encode(v)))
            .collect();
        let json = serde_json::to_vec_pretty(&encoded)
            .map_err(|e| TrackerError::Serialization(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| TrackerError::Io(e.error))?;
        Ok(())
    }
}

impl Tracker for FileTracker {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| TrackerError::LockPoisoned(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| TrackerError::LockPoisoned(e.to_string()))?;
        let previous = entries.insert(key.to_string(), value.to_vec());
        if let Err(e) = self.persist(&entries) {
            // Keep memory in step with what is on disk.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn list_prefixed(&self, prefix: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| TrackerError::LockPoisoned(e.to_string()))?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

fn decode(bytes: &[u8]) -> Result<BTreeMap<String, Vec<u8>>> {
    let raw: BTreeMap<String, String> =
        serde_json::from_slice(bytes).map_err(|e| TrackerError::Serialization(e.to_string()))?;
    raw.into_iter()
        .map(|(key, value)| match hex::decode(&value) {
            Ok(bytes) => Ok((key, bytes)),
            Err(e) => Err(TrackerError::Corrupt {
                key,
                reason: e.to_string(),
            }),
        })
        .collect()
}
