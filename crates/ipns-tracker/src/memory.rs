//! In-memory tracker for testing and ephemeral use.
//!
//! [`InMemoryTracker`] stores all entries in a `BTreeMap` protected by a
//! `RwLock`. Nothing survives the process, so it is only suitable for tests
//! and for sessions that never need crash recovery.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{Result, TrackerError};
use crate::traits::Tracker;

/// An in-memory implementation of [`Tracker`].
#[derive(Debug, Default)]
pub struct InMemoryTracker {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryTracker {
    /// Create a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns `true` if no entry is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Tracker for InMemoryTracker {
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
        entries.insert(key.to_string(), value.to_vec());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_is_none() {
        let tracker = InMemoryTracker::new();
        assert!(tracker.get("refs/heads/main").unwrap().is_none());
    }

    #[test]
    fn set_then_get() {
        let tracker = InMemoryTracker::new();
        tracker.set("refs/heads/main", &[1, 2, 3]).unwrap();
        assert_eq!(tracker.get("refs/heads/main").unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn set_overwrites() {
        let tracker = InMemoryTracker::new();
        tracker.set("k", b"old").unwrap();
        tracker.set("k", b"new").unwrap();
        assert_eq!(tracker.get("k").unwrap(), Some(b"new".to_vec()));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn list_prefixed_filters_and_keeps_full_keys() {
        let tracker = InMemoryTracker::new();
        tracker.set("//lobj/a", b"1").unwrap();
        tracker.set("//lobj/b", b"2").unwrap();
        tracker.set("refs/heads/main", b"3").unwrap();
        tracker.set("//lobk", b"4").unwrap();

        let listed = tracker.list_prefixed("//lobj").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed.get("//lobj/a"), Some(&b"1".to_vec()));
        assert_eq!(listed.get("//lobj/b"), Some(&b"2".to_vec()));
    }

    #[test]
    fn list_prefixed_empty_prefix_lists_all() {
        let tracker = InMemoryTracker::new();
        tracker.set("a", b"1").unwrap();
        tracker.set("b", b"2").unwrap();
        assert_eq!(tracker.list_prefixed("").unwrap().len(), 2);
    }
}
