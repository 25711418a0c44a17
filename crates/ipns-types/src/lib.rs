//! Foundation types for the git-over-IPNS bridge.
//!
//! Every other bridge crate depends on `ipns-types`. It owns the two
//! identifier spaces the bridge moves between and the translation law that
//! ties them together.
//!
//! # Key Types
//!
//! - [`ObjectHash`] -- a git object name (SHA-1 of the raw, header-prefixed object)
//! - [`Cid`] -- a content identifier of the distributed store (re-exported from `cid`)
//! - [`to_object_hash`] / [`to_content_id`] -- translation between the two

pub mod error;
pub mod object;
pub mod translate;

pub use cid::Cid;
pub use error::TypeError;
pub use object::{ObjectHash, HASH_LEN};
pub use translate::{
    parse_content_id, to_content_id, to_object_hash, GIT_RAW_CODEC, SHA1_MULTIHASH,
};
