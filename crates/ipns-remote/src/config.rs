use ipns_types::Cid;
use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, RemoteResult};

/// Configuration for a bridge session.
///
/// Every field has a default, so a partial TOML document is enough:
///
/// ```
/// use ipns_remote::BridgeConfig;
///
/// let config = BridgeConfig::from_toml_str("namespace = \"testnet\"").unwrap();
/// assert_eq!(config.namespace, "testnet");
/// assert_eq!(config.large_object_threshold, 1 << 21);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Objects strictly larger than this many bytes are stored externally.
    pub large_object_threshold: usize,
    /// Reserved top-level directory holding the large-object index.
    pub objects_dir: String,
    /// Tracker key prefix for the large-object recovery ledger.
    pub tracker_prefix: String,
    /// Name of the symbolic ref naming the default branch.
    pub head_name: String,
    /// Target written into a newly created symbolic HEAD.
    pub default_head_target: String,
    /// Label for the published namespace in the push report.
    pub namespace: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            large_object_threshold: 1 << 21, // 2 MiB
            objects_dir: "objects".into(),
            tracker_prefix: "//lobj".into(),
            head_name: "HEAD".into(),
            default_head_target: "refs/heads/master".into(),
            namespace: "IPFS".into(),
        }
    }
}

impl BridgeConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> RemoteResult<Self> {
        toml::from_str(s).map_err(|e| RemoteError::Config(e.to_string()))
    }

    /// Whether an object of `len` bytes must be externalized.
    pub fn is_large(&self, len: usize) -> bool {
        len > self.large_object_threshold
    }

    /// Prefix shared by all ledger keys, including the trailing slash.
    pub fn ledger_prefix(&self) -> String {
        format!("{}/", self.tracker_prefix)
    }

    /// Ledger key for one large object.
    pub fn ledger_key(&self, object: &Cid) -> String {
        format!("{}/{object}", self.tracker_prefix)
    }

    /// Tree path at which a large object's external content is linked.
    pub fn object_path(&self, object: &Cid) -> String {
        format!("{}/{object}", self.objects_dir)
    }
}
