//! Autosave orchestration for one open file
//!
//! Edits mark the session dirty immediately and restart the debounce
//! timer. When the timer fires a save is issued with the content as it is
//! at that moment, carrying the last saved version so the server can
//! detect stale writes.
//!
//! Invariants:
//! - at most one save is in flight per session;
//! - `dirty` is true whenever the editor content differs from the last
//!   content the server acknowledged;
//! - a response for an older snapshot never clears `dirty` for newer
//!   content, it reschedules a save instead.

use super::debounce::Debouncer;
use super::status::{SaveStatus, StatusFlags};
use crate::client::FileStore;
use crate::database::{FileChanges, UserFile};
use crate::error::{AppError, ErrorKind, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;

/// What the UI needs to render the editor and its header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorSnapshot {
    pub file_id: String,
    pub dirty: bool,
    pub saving: bool,
    pub saved_version: i64,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub last_error: Option<ErrorKind>,
    /// Server version reported by an unresolved conflict
    pub conflict: Option<i64>,
    pub status: SaveStatus,
}

/// How to leave a version conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Rebase onto the server's version and overwrite it with local content
    KeepLocal,
    /// Discard local edits and take the server's content
    AcceptRemote,
}

#[derive(Debug)]
struct EditorState {
    content: String,
    saved_content: String,
    saved_version: i64,
    /// Bumped on every edit; lets a finished save tell whether it is stale
    revision: u64,
    dirty: bool,
    saving: bool,
    last_saved_at: Option<DateTime<Utc>>,
    last_error: Option<ErrorKind>,
    conflict: Option<i64>,
}

impl EditorState {
    fn recompute_dirty(&mut self) {
        self.dirty = self.content != self.saved_content;
    }

    fn status(&self) -> SaveStatus {
        SaveStatus::from_flags(StatusFlags {
            saving: self.saving,
            dirty: self.dirty,
            last_saved_at: self.last_saved_at,
            failed: self.last_error.is_some(),
            conflict: self.conflict.is_some(),
        })
    }

    fn snapshot(&self, file_id: &str) -> EditorSnapshot {
        EditorSnapshot {
            file_id: file_id.to_string(),
            dirty: self.dirty,
            saving: self.saving,
            saved_version: self.saved_version,
            last_saved_at: self.last_saved_at,
            last_error: self.last_error,
            conflict: self.conflict,
            status: self.status(),
        }
    }
}

struct Shared<S> {
    store: Arc<S>,
    file_id: String,
    debouncer: Debouncer,
    state: Mutex<EditorState>,
    snapshots: watch::Sender<EditorSnapshot>,
}

impl<S: FileStore> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &EditorState) {
        self.snapshots.send_replace(state.snapshot(&self.file_id));
    }
}

/// Editor session for a single file with debounced autosave
///
/// Dropping the session cancels a pending debounce; a save already in
/// flight still completes.
pub struct AutosaveSession<S: FileStore> {
    shared: Arc<Shared<S>>,
}

impl<S: FileStore> AutosaveSession<S> {
    /// Start editing `file`, saving after `delay` of inactivity
    pub fn open(store: Arc<S>, file: &UserFile, delay: Duration) -> Self {
        let state = EditorState {
            content: file.content.clone(),
            saved_content: file.content.clone(),
            saved_version: file.version,
            revision: 0,
            dirty: false,
            saving: false,
            last_saved_at: None,
            last_error: None,
            conflict: None,
        };
        let (snapshots, _) = watch::channel(state.snapshot(&file.id));

        tracing::debug!("Opened editor session for file: {}", file.id);

        Self {
            shared: Arc::new(Shared {
                store,
                file_id: file.id.clone(),
                debouncer: Debouncer::new(delay),
                state: Mutex::new(state),
                snapshots,
            }),
        }
    }

    pub fn file_id(&self) -> &str {
        &self.shared.file_id
    }

    /// Replace the editor content
    pub fn edit(&self, content: impl Into<String>) {
        let content = content.into();

        let schedule = {
            let mut state = self.shared.lock();
            if state.content == content {
                return;
            }

            state.content = content;
            state.revision += 1;
            state.recompute_dirty();
            self.shared.publish(&state);

            state.dirty && state.conflict.is_none()
        };

        if schedule {
            schedule_save(&self.shared);
        } else {
            self.shared.debouncer.cancel();
        }
    }

    /// Skip the debounce window and save now
    pub fn save_now(&self) {
        self.shared.debouncer.cancel();
        start_save(Arc::clone(&self.shared));
    }

    /// Leave a version conflict by fetching the server's latest copy
    pub async fn resolve_conflict(&self, resolution: ConflictResolution) -> Result<()> {
        let latest = self.shared.store.get(&self.shared.file_id).await?;

        let schedule = {
            let mut state = self.shared.lock();
            state.conflict = None;
            state.last_error = None;
            state.saved_version = latest.version;
            state.saved_content = latest.content.clone();

            if resolution == ConflictResolution::AcceptRemote {
                state.content = latest.content;
                state.revision += 1;
            }

            state.recompute_dirty();
            self.shared.publish(&state);

            state.dirty && !state.saving
        };

        tracing::info!(
            "Resolved conflict on file {} with {:?}",
            self.shared.file_id,
            resolution
        );

        if schedule {
            schedule_save(&self.shared);
        }

        Ok(())
    }

    /// Cancel any pending debounce without saving
    pub fn dispose(&self) {
        if self.shared.debouncer.cancel() {
            tracing::debug!("Discarded pending autosave for file: {}", self.shared.file_id);
        }
    }

    pub fn content(&self) -> String {
        self.shared.lock().content.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.shared.lock().dirty
    }

    pub fn is_saving(&self) -> bool {
        self.shared.lock().saving
    }

    pub fn status(&self) -> SaveStatus {
        self.shared.lock().status()
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        self.shared.lock().snapshot(&self.shared.file_id)
    }

    /// Stream of snapshots, updated on every state change
    pub fn subscribe(&self) -> watch::Receiver<EditorSnapshot> {
        self.shared.snapshots.subscribe()
    }
}

fn schedule_save<S: FileStore>(shared: &Arc<Shared<S>>) {
    // Weak: the timer task must not keep a dropped session alive
    let weak: Weak<Shared<S>> = Arc::downgrade(shared);
    shared.debouncer.schedule(move || {
        if let Some(shared) = weak.upgrade() {
            start_save(shared);
        }
    });
}

fn start_save<S: FileStore>(shared: Arc<Shared<S>>) {
    let (snapshot, expected, revision) = {
        let mut state = shared.lock();
        if state.saving || !state.dirty || state.conflict.is_some() {
            return;
        }

        state.saving = true;
        shared.publish(&state);

        (state.content.clone(), state.saved_version, state.revision)
    };

    tracing::debug!(
        "Saving file {} ({} bytes, base version {})",
        shared.file_id,
        snapshot.len(),
        expected
    );

    tokio::spawn(async move {
        let changes = FileChanges::content(snapshot.clone()).expecting(expected);
        let result = shared.store.update(&shared.file_id, changes).await;
        finish_save(&shared, snapshot, revision, result);
    });
}

fn finish_save<S: FileStore>(
    shared: &Arc<Shared<S>>,
    snapshot: String,
    revision: u64,
    result: Result<UserFile>,
) {
    let reschedule = {
        let mut state = shared.lock();
        state.saving = false;
        let edited_during_save = state.revision != revision;

        match result {
            Ok(file) => {
                state.saved_content = snapshot;
                state.saved_version = file.version;
                state.last_saved_at = Some(file.updated_at);
                state.last_error = None;
                tracing::debug!("Saved file {} at version {}", file.id, file.version);
            }
            Err(AppError::VersionConflict { current, .. }) => {
                tracing::warn!(
                    "Version conflict saving file {}: server is at version {}",
                    shared.file_id,
                    current
                );
                state.conflict = Some(current);
                state.last_error = Some(ErrorKind::VersionConflict);
            }
            Err(e) => {
                tracing::warn!("Failed to save file {}: {}", shared.file_id, e);
                state.last_error = Some(e.kind());
            }
        }

        state.recompute_dirty();
        shared.publish(&state);

        state.dirty && edited_during_save && state.conflict.is_none()
    };

    if reschedule {
        schedule_save(shared);
    }
}
