//! Translation between git object names and store content identifiers.
//!
//! A git object lives in the store as a CIDv1 whose codec is `git-raw` and
//! whose multihash is the object's SHA-1. Translation is therefore lossless
//! in both directions: the digest *is* the object name.

use cid::multihash::Multihash;
use cid::Cid;

use crate::error::TypeError;
use crate::object::{ObjectHash, HASH_LEN};

/// Multicodec code for raw git objects.
pub const GIT_RAW_CODEC: u64 = 0x78;

/// Multihash code for SHA-1.
pub const SHA1_MULTIHASH: u64 = 0x11;

/// Decode a content identifier into the git object name it addresses.
///
/// Fails with [`TypeError::MalformedIdentifier`] if the digest is not a
/// 20-byte SHA-1.
pub fn to_object_hash(cid: &Cid) -> Result<ObjectHash, TypeError> {
    let multihash = cid.hash();
    if multihash.code() != SHA1_MULTIHASH {
        return Err(TypeError::MalformedIdentifier {
            identifier: cid.to_string(),
            reason: format!("multihash code {:#x} is not sha1", multihash.code()),
        });
    }
    if multihash.digest().len() != HASH_LEN {
        return Err(TypeError::MalformedIdentifier {
            identifier: cid.to_string(),
            reason: format!(
                "digest is {} bytes, expected {HASH_LEN}",
                multihash.digest().len()
            ),
        });
    }
    ObjectHash::from_slice(multihash.digest()).map_err(|e| TypeError::MalformedIdentifier {
        identifier: cid.to_string(),
        reason: e.to_string(),
    })
}

/// Build the content identifier a git object is stored under.
///
/// Exact inverse of [`to_object_hash`].
pub fn to_content_id(hash: &ObjectHash) -> Result<Cid, TypeError> {
    let multihash =
        Multihash::<64>::wrap(SHA1_MULTIHASH, hash.as_bytes()).map_err(|e| {
            TypeError::MalformedIdentifier {
                identifier: hash.to_hex(),
                reason: e.to_string(),
            }
        })?;
    Ok(Cid::new_v1(GIT_RAW_CODEC, multihash))
}

/// Parse a textual content identifier (any multibase, v0 or v1).
pub fn parse_content_id(s: &str) -> Result<Cid, TypeError> {
    s.parse::<Cid>().map_err(|e| TypeError::MalformedIdentifier {
        identifier: s.to_string(),
        reason: e.to_string(),
    })
}
