use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::TypeError;

/// Length in bytes of a git object name.
pub const HASH_LEN: usize = 20;

/// Name of a git object: the SHA-1 of its raw encoding.
///
/// The raw encoding is the header-prefixed form git hashes
/// (`<type> <size>\0<content>`), so the same bytes always produce the same
/// `ObjectHash` and a fetched object can be checked against the name it was
/// requested under.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHash([u8; HASH_LEN]);

impl ObjectHash {
    /// Hash a raw, header-prefixed git object.
    pub fn of_raw(raw: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(raw);
        Self(hasher.finalize().into())
    }

    /// Hash object content under a git object type (`blob`, `tree`, ...).
    ///
    /// Returns the hash together with the raw encoding that was hashed.
    pub fn of_typed(object_type: &str, content: &[u8]) -> (Self, Vec<u8>) {
        let mut raw = format!("{object_type} {}\0", content.len()).into_bytes();
        raw.extend_from_slice(content);
        (Self::of_raw(&raw), raw)
    }

    /// Create an `ObjectHash` from a pre-computed digest.
    pub const fn from_hash(hash: [u8; HASH_LEN]) -> Self {
        Self(hash)
    }

    /// Create an `ObjectHash` from a digest slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; HASH_LEN] = bytes.try_into().map_err(|_| TypeError::InvalidLength {
            expected: HASH_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// The all-zero hash. Used as the "unknown remote value" placeholder.
    pub const fn zero() -> Self {
        Self([0u8; HASH_LEN])
    }

    /// Returns `true` if this is the all-zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_LEN]
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Hex-encoded string representation (40 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 7 characters, as git abbreviates).
    pub fn short_hex(&self) -> String {
        let mut s = self.to_hex();
        s.truncate(7);
        s
    }

    /// Parse from a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHash({})", self.short_hex())
    }
}

impl fmt::Display for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; HASH_LEN]> for ObjectHash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectHash> for [u8; HASH_LEN] {
    fn from(hash: ObjectHash) -> Self {
        hash.0
    }
}
