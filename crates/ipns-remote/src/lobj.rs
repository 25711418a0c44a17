//! Large-object index.
//!
//! Objects above the size threshold are uploaded as plain files and linked
//! into the published tree under `objects/<object-cid>`. The index maps each
//! git object identifier to the external identifier holding its bytes. It is
//! read lazily from the tree on first use.
//!
//! Every mapping is also written to the tracker (`//lobj/<object-cid>`)
//! before the tree is touched. If a push dies between the two writes, the
//! ledger still knows about the object and Finish patches it back in.

use std::collections::HashMap;

use ipns_shell::{join, BlockFormat, StorageShell};
use ipns_tracker::Tracker;
use ipns_types::{parse_content_id, Cid};
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::patch::PatchSequencer;

/// Lazily loaded mapping from object identifier to external identifier.
#[derive(Clone, Debug, Default)]
pub struct LargeObjectIndex {
    entries: Option<HashMap<Cid, Cid>>,
}

impl LargeObjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once the index has been read from the tree.
    pub fn is_loaded(&self) -> bool {
        self.entries.is_some()
    }

    /// Number of known large objects (zero before loading).
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// External identifier for `object`, if indexed.
    pub fn get(&self, object: &Cid) -> Option<&Cid> {
        self.entries.as_ref()?.get(object)
    }

    pub fn contains(&self, object: &Cid) -> bool {
        self.get(object).is_some()
    }

    /// Read the reserved directory of `root` into the index.
    ///
    /// Only the first call lists anything. A root without the reserved
    /// directory yields an empty index. Entries whose name is not an
    /// identifier are skipped.
    pub fn ensure_loaded<S: StorageShell + ?Sized>(
        &mut self,
        shell: &S,
        root: &Cid,
        config: &BridgeConfig,
    ) -> RemoteResult<()> {
        if self.entries.is_some() {
            return Ok(());
        }

        let path = join(root, &config.objects_dir);
        let links = match shell.list(&path) {
            Ok(links) => links,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(source) => return Err(RemoteError::Listing { path, source }),
        };

        let mut entries = HashMap::with_capacity(links.len());
        for link in links {
            match parse_content_id(&link.name) {
                Ok(object) => {
                    entries.insert(object, link.cid);
                }
                Err(e) => {
                    warn!(name = %link.name, error = %e, "skipping foreign large-object entry")
                }
            }
        }
        debug!(root = %root, count = entries.len(), "loaded large-object index");
        self.entries = Some(entries);
        Ok(())
    }

    /// Record a mapping that has just been patched into the tree.
    ///
    /// Ignored before loading: the tree is the source of truth and the
    /// next load will see the patch.
    pub fn record(&mut self, object: Cid, external: Cid) {
        if let Some(entries) = self.entries.as_mut() {
            entries.insert(object, external);
        }
    }

    /// Fetch and verify the bytes of an indexed object.
    ///
    /// Fails with [`RemoteError::NotProvided`] for objects not in the index
    /// and with [`RemoteError::IntegrityMismatch`] if the fetched bytes do
    /// not re-derive `object`.
    pub fn resolve<S: StorageShell + ?Sized, T: Tracker + ?Sized>(
        &mut self,
        shell: &S,
        tracker: &T,
        root: &Cid,
        config: &BridgeConfig,
        object: &Cid,
    ) -> RemoteResult<Vec<u8>> {
        self.ensure_loaded(shell, root, config)?;
        let external = *self
            .get(object)
            .ok_or(RemoteError::NotProvided { object: *object })?;

        tracker.set(&config.ledger_key(object), external.to_string().as_bytes())?;

        let path = external.to_string();
        let data = shell
            .cat(&path)
            .map_err(|source| RemoteError::Fetch { path, source })?;

        let derived = shell
            .encode_raw_block(&data, BlockFormat::Git)
            .map_err(|source| RemoteError::Encode { source })?;
        if derived != *object {
            return Err(RemoteError::IntegrityMismatch {
                requested: *object,
                derived,
            });
        }
        Ok(data)
    }

    /// Store an oversized object outside the main graph.
    ///
    /// Uploads `data`, writes the ledger entry, then links the upload under
    /// `objects/<object>` through `sequencer`. Returns the external
    /// identifier.
    pub fn externalize<S: StorageShell + ?Sized, T: Tracker + ?Sized>(
        &mut self,
        shell: &S,
        tracker: &T,
        sequencer: &mut PatchSequencer,
        config: &BridgeConfig,
        object: &Cid,
        data: &[u8],
    ) -> RemoteResult<Cid> {
        let external = shell
            .add(data)
            .map_err(|source| RemoteError::Upload { source })?;
        tracker.set(&config.ledger_key(object), external.to_string().as_bytes())?;
        sequencer.apply(shell, &config.object_path(object), &external)?;
        self.record(*object, external);
        debug!(%object, %external, size = data.len(), "externalized large object");
        Ok(external)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipns_shell::InMemoryShell;
    use ipns_tracker::InMemoryTracker;
    use ipns_types::{to_content_id, ObjectHash};

    /// Returns (object cid, raw bytes) for a blob.
    fn blob(content: &[u8]) -> (Cid, Vec<u8>) {
        let (hash, raw) = ObjectHash::of_typed("blob", content);
        (to_content_id(&hash).unwrap(), raw)
    }

    fn setup() -> (InMemoryShell, InMemoryTracker, PatchSequencer, BridgeConfig) {
        let shell = InMemoryShell::new();
        let root = shell.empty_directory().unwrap();
        (
            shell,
            InMemoryTracker::new(),
            PatchSequencer::new(root),
            BridgeConfig::default(),
        )
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    #[test]
    fn missing_objects_directory_is_empty_index() {
        let (shell, _, seq, config) = setup();
        let mut index = LargeObjectIndex::new();
        index.ensure_loaded(&shell, seq.root(), &config).unwrap();
        assert!(index.is_loaded());
        assert!(index.is_empty());
    }

    #[test]
    fn loads_entries_from_tree() {
        let (shell, tracker, mut seq, config) = setup();
        let (object, raw) = blob(b"big");
        LargeObjectIndex::new()
            .externalize(&shell, &tracker, &mut seq, &config, &object, &raw)
            .unwrap();

        let mut index = LargeObjectIndex::new();
        index.ensure_loaded(&shell, seq.root(), &config).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains(&object));
    }

    #[test]
    fn ensure_loaded_is_idempotent() {
        let (shell, tracker, mut seq, config) = setup();
        let (first, raw) = blob(b"first");
        let mut writer = LargeObjectIndex::new();
        writer
            .externalize(&shell, &tracker, &mut seq, &config, &first, &raw)
            .unwrap();

        let mut index = LargeObjectIndex::new();
        index.ensure_loaded(&shell, seq.root(), &config).unwrap();
        let once = index.clone();

        // A later tree change is not picked up by a second call.
        let (second, raw) = blob(b"second");
        writer
            .externalize(&shell, &tracker, &mut seq, &config, &second, &raw)
            .unwrap();
        index.ensure_loaded(&shell, seq.root(), &config).unwrap();

        assert_eq!(index.len(), once.len());
        assert!(index.contains(&first));
        assert!(!index.contains(&second));
    }

    #[test]
    fn malformed_entry_name_is_skipped() {
        let (shell, tracker, mut seq, config) = setup();
        let (object, raw) = blob(b"kept");
        LargeObjectIndex::new()
            .externalize(&shell, &tracker, &mut seq, &config, &object, &raw)
            .unwrap();
        let file = shell.add(b"x").unwrap();
        seq.apply(&shell, "objects/not-a-cid", &file).unwrap();

        let mut index = LargeObjectIndex::new();
        index.ensure_loaded(&shell, seq.root(), &config).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains(&object));

        let data = index
            .resolve(&shell, &tracker, seq.root(), &config, &object)
            .unwrap();
        assert_eq!(data, raw);
    }

    #[test]
    fn objects_path_that_is_a_file_fails_loading() {
        let (shell, _, mut seq, config) = setup();
        let file = shell.add(b"x").unwrap();
        seq.apply(&shell, "objects", &file).unwrap();
        let err = LargeObjectIndex::new()
            .ensure_loaded(&shell, seq.root(), &config)
            .unwrap_err();
        assert!(matches!(err, RemoteError::Listing { .. }));
    }

    // -----------------------------------------------------------------------
    // Externalize
    // -----------------------------------------------------------------------

    #[test]
    fn externalize_writes_ledger_then_tree() {
        let (shell, tracker, mut seq, config) = setup();
        let (object, raw) = blob(b"payload");
        let external = LargeObjectIndex::new()
            .externalize(&shell, &tracker, &mut seq, &config, &object, &raw)
            .unwrap();

        assert_eq!(
            tracker.get(&config.ledger_key(&object)).unwrap(),
            Some(external.to_string().into_bytes())
        );
        let linked = shell.list(&join(seq.root(), "objects")).unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].name, object.to_string());
        assert_eq!(linked[0].cid, external);
    }

    #[test]
    fn externalize_records_into_loaded_index() {
        let (shell, tracker, mut seq, config) = setup();
        let mut index = LargeObjectIndex::new();
        index.ensure_loaded(&shell, seq.root(), &config).unwrap();
        let (object, raw) = blob(b"payload");
        let external = index
            .externalize(&shell, &tracker, &mut seq, &config, &object, &raw)
            .unwrap();
        assert_eq!(index.get(&object), Some(&external));
    }

    // -----------------------------------------------------------------------
    // Resolve
    // -----------------------------------------------------------------------

    #[test]
    fn resolve_returns_verified_bytes_and_leaves_breadcrumb() {
        let (shell, tracker, mut seq, config) = setup();
        let (object, raw) = blob(b"verified");
        LargeObjectIndex::new()
            .externalize(&shell, &tracker, &mut seq, &config, &object, &raw)
            .unwrap();

        let fresh_tracker = InMemoryTracker::new();
        let mut index = LargeObjectIndex::new();
        let data = index
            .resolve(&shell, &fresh_tracker, seq.root(), &config, &object)
            .unwrap();
        assert_eq!(data, raw);
        assert!(fresh_tracker
            .get(&config.ledger_key(&object))
            .unwrap()
            .is_some());
    }

    #[test]
    fn resolve_unknown_object_is_not_provided() {
        let (shell, tracker, seq, config) = setup();
        let (object, _) = blob(b"never externalized");
        let err = LargeObjectIndex::new()
            .resolve(&shell, &tracker, seq.root(), &config, &object)
            .unwrap_err();
        assert!(err.is_not_provided());
        assert!(tracker.is_empty());
    }

    #[test]
    fn resolve_detects_tampering() {
        let (shell, tracker, mut seq, config) = setup();
        let (object, raw) = blob(b"genuine");
        let external = LargeObjectIndex::new()
            .externalize(&shell, &tracker, &mut seq, &config, &object, &raw)
            .unwrap();
        assert!(shell.tamper(&external, b"blob 7\0forged!".to_vec()));

        let err = LargeObjectIndex::new()
            .resolve(&shell, &tracker, seq.root(), &config, &object)
            .unwrap_err();
        match err {
            RemoteError::IntegrityMismatch { requested, derived } => {
                assert_eq!(requested, object);
                assert_ne!(derived, object);
            }
            other => panic!("expected IntegrityMismatch, got {other:?}"),
        }
    }
}
