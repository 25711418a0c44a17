//! The [`Tracker`] trait defining the ledger interface.

use std::collections::BTreeMap;

use crate::error::Result;

/// Durable key-value ledger.
///
/// Keys are UTF-8 strings; values are opaque bytes. A `set` must be durable
/// before it returns, since callers write ledger entries ahead of the
/// remote mutation they describe.
pub trait Tracker {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Create or overwrite the value under `key`.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// All entries whose key starts with `prefix`, keyed by the full key.
    fn list_prefixed(&self, prefix: &str) -> Result<BTreeMap<String, Vec<u8>>>;
}

impl<T: Tracker + ?Sized> Tracker for &T {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn list_prefixed(&self, prefix: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        (**self).list_prefixed(prefix)
    }
}
