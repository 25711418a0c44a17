//! One list/push/finish interaction with a remote.
//!
//! A [`Session`] owns everything that used to be process-wide: the shell
//! handle, the current root identifier, the lazily loaded large-object
//! index and the "did we push" flag. Its lifecycle is
//! `Initialized → Listing* → Pushing? → Finished`.

use std::fmt;

use ipns_shell::{join, StorageShell};
use ipns_tracker::Tracker;
use ipns_types::{parse_content_id, to_content_id, to_object_hash, Cid, ObjectHash, TypeError};
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::lobj::LargeObjectIndex;
use crate::patch::PatchSequencer;
use crate::repo::{LocalRepository, ObjectPusher};
use crate::walker::{RefKind, RefTreeWalker};

/// Lifecycle stage of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Initialized,
    Listing,
    Pushing,
    Finished,
}

/// Report of a completed publish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Published {
    pub namespace: String,
    /// Root identifier the naming layer should now point at.
    pub root: Cid,
}

impl fmt::Display for Published {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pushed to {} as ipns://{}", self.namespace, self.root)
    }
}

/// Session state for one remote interaction.
pub struct Session<S, T> {
    shell: S,
    tracker: T,
    config: BridgeConfig,
    sequencer: PatchSequencer,
    index: LargeObjectIndex,
    state: SessionState,
    did_push: bool,
}

impl<S: StorageShell, T: Tracker> Session<S, T> {
    /// Start a session against an existing published root.
    pub fn new(shell: S, tracker: T, root: Cid, config: BridgeConfig) -> Self {
        Self {
            shell,
            tracker,
            config,
            sequencer: PatchSequencer::new(root),
            index: LargeObjectIndex::new(),
            state: SessionState::Initialized,
            did_push: false,
        }
    }

    /// Start a session for a brand-new remote, rooted at an empty directory.
    pub fn create(shell: S, tracker: T, config: BridgeConfig) -> RemoteResult<Self> {
        let root = shell
            .empty_directory()
            .map_err(|source| RemoteError::Root { source })?;
        Ok(Self::new(shell, tracker, root, config))
    }

    /// The current root identifier.
    pub fn root(&self) -> &Cid {
        self.sequencer.root()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn did_push(&self) -> bool {
        self.did_push
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Answer git's `list` / `list for-push`.
    pub fn list<R: LocalRepository>(
        &mut self,
        repo: &R,
        for_push: bool,
    ) -> RemoteResult<Vec<String>> {
        if for_push {
            self.list_for_push(repo)
        } else {
            self.list_refs()
        }
    }

    /// Every ref published under the current root, one line each:
    /// `<hash> <path>` for heads, `@<target> <path>` for symbolic refs.
    pub fn list_refs(&mut self) -> RemoteResult<Vec<String>> {
        self.enter_listing()?;
        let entries =
            RefTreeWalker::new(&self.shell, &self.config.objects_dir).walk(self.sequencer.root())?;

        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.kind {
                RefKind::Head => {
                    let hash = to_object_hash(&entry.cid)?;
                    out.push(format!("{hash} {}", entry.path));
                }
                RefKind::Symbolic => {
                    let path = entry.cid.to_string();
                    let text = match self.shell.cat(&path) {
                        Ok(text) => text,
                        Err(source) => return Err(RemoteError::Fetch { path, source }),
                    };
                    let target = decode_ref_text(path, text)?;
                    out.push(format!("@{} {}", target.trim(), entry.path));
                }
            }
        }
        debug!(root = %self.root(), refs = out.len(), "listed refs");
        Ok(out)
    }

    /// Local branches with a zero hash: the remote side's values are not
    /// declared up front.
    pub fn list_for_push<R: LocalRepository>(&mut self, repo: &R) -> RemoteResult<Vec<String>> {
        self.enter_listing()?;
        let zero = ObjectHash::zero();
        Ok(repo
            .branches()?
            .into_iter()
            .map(|(name, _)| format!("{zero} {name}"))
            .collect())
    }

    /// Target of the symbolic ref `name` under the current root.
    ///
    /// Returns `Ok(None)` when no such leaf exists, or when it is empty.
    pub fn symbolic_ref(&self, name: &str) -> RemoteResult<Option<String>> {
        let path = join(self.sequencer.root(), name);
        match self.shell.cat(&path) {
            Ok(text) => {
                let target = decode_ref_text(path, text)?.trim().to_string();
                Ok(Some(target).filter(|t| !t.is_empty()))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(source) => Err(RemoteError::Fetch { path, source }),
        }
    }

    /// Serve a block request from the large-object index.
    ///
    /// [`RemoteError::NotProvided`] tells the caller to look elsewhere.
    pub fn provide_block(&mut self, object: &Cid) -> RemoteResult<Vec<u8>> {
        self.ensure_open()?;
        self.index.resolve(
            &self.shell,
            &self.tracker,
            self.sequencer.root(),
            &self.config,
            object,
        )
    }

    /// Publish `local` as `remote_ref`.
    ///
    /// Walks the object graph below the local tip, externalizing every
    /// object over the size threshold as it is visited, then links the tip
    /// at `remote_ref` and creates a default `HEAD` if none exists.
    ///
    /// Patches already applied stay applied if a later step fails; the
    /// root is never rolled back.
    pub fn push<R: LocalRepository + ObjectPusher>(
        &mut self,
        repo: &R,
        local: &str,
        remote_ref: &str,
    ) -> RemoteResult<String> {
        self.ensure_open()?;
        self.state = SessionState::Pushing;
        self.did_push = true;

        let head = repo.resolve_reference(local)?;
        {
            let Self {
                shell,
                tracker,
                config,
                sequencer,
                index,
                ..
            } = self;
            let mut visit = |object: &Cid, data: &[u8]| -> RemoteResult<()> {
                if config.is_large(data.len()) {
                    index.externalize(&*shell, &*tracker, sequencer, config, object, data)?;
                }
                Ok(())
            };
            repo.push_hash(&head, &mut visit)?;
        }

        self.tracker.set(remote_ref, head.as_bytes())?;

        let tip = to_content_id(&head)?;
        self.sequencer.apply(&self.shell, remote_ref, &tip)?;

        let head_name = self.config.head_name.clone();
        if self.symbolic_ref(&head_name)?.is_none() {
            let leaf = self
                .shell
                .add(self.config.default_head_target.as_bytes())
                .map_err(|source| RemoteError::Upload { source })?;
            self.sequencer.apply(&self.shell, &head_name, &leaf)?;
        }

        info!(local, remote = remote_ref, head = %head.short_hex(), "pushed ref");
        Ok(local.to_string())
    }

    /// Close the session.
    ///
    /// After a push, replays every ledger entry missing from the
    /// large-object index into the tree, then reports the published root.
    /// Returns `Ok(None)` if nothing was pushed.
    ///
    /// The session only closes once the report is built; a failed replay
    /// leaves it open so `finish` can be called again.
    pub fn finish(&mut self) -> RemoteResult<Option<Published>> {
        self.ensure_open()?;
        if !self.did_push {
            self.state = SessionState::Finished;
            return Ok(None);
        }

        self.index
            .ensure_loaded(&self.shell, self.sequencer.root(), &self.config)?;

        let prefix = self.config.ledger_prefix();
        for (key, value) in self.tracker.list_prefixed(&prefix)? {
            let Some(name) = key.strip_prefix(&prefix) else {
                continue;
            };
            let object = parse_content_id(name)?;
            if self.index.contains(&object) {
                continue;
            }
            let external = parse_ledger_value(&key, &value)?;
            warn!(%object, %external, "restoring large object missing from published tree");
            self.sequencer
                .apply(&self.shell, &self.config.object_path(&object), &external)?;
            self.index.record(object, external);
        }

        let published = Published {
            namespace: self.config.namespace.clone(),
            root: *self.sequencer.root(),
        };
        self.state = SessionState::Finished;
        info!("{published}");
        Ok(Some(published))
    }

    fn ensure_open(&self) -> RemoteResult<()> {
        if self.state == SessionState::Finished {
            return Err(RemoteError::SessionFinished);
        }
        Ok(())
    }

    fn enter_listing(&mut self) -> RemoteResult<()> {
        self.ensure_open()?;
        if self.state == SessionState::Initialized {
            self.state = SessionState::Listing;
        }
        Ok(())
    }
}

impl<S, T> fmt::Debug for Session<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("root", self.sequencer.root())
            .field("state", &self.state)
            .field("did_push", &self.did_push)
            .field("large_objects", &self.index.len())
            .finish()
    }
}

fn decode_ref_text(path: String, text: Vec<u8>) -> RemoteResult<String> {
    String::from_utf8(text).map_err(|source| RemoteError::InvalidSymbolicRef { path, source })
}

fn parse_ledger_value(key: &str, value: &[u8]) -> RemoteResult<Cid> {
    let text = std::str::from_utf8(value).map_err(|e| TypeError::MalformedIdentifier {
        identifier: key.to_string(),
        reason: e.to_string(),
    })?;
    Ok(parse_content_id(text.trim())?)
}
