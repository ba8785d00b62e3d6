//! Debounced save session between an editing surface and the store
//!
//! State machine per bound document:
//!
//! - `Idle`: the store holds everything the surface shows.
//! - `PendingSave`: an edit is waiting for the debounce task.
//! - `Switching`: the surface is being re-hydrated for another document.
//!
//! Every scheduled task carries the generation it was created in. Cancelling
//! bumps the generation under the session lock, so a task that wakes after a
//! newer edit or a switch finds a stale generation and writes nothing.

use crate::{EditingSurface, Result, SyncError};
use content::{looks_like_markup, rich_to_plain, DocumentStats};
use doc_model::{ContentMode, DocumentId, DocumentPatch};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use store::{DocumentStore, EditingSettings, SharedStore, SwitchPolicy};
use tokio::task::JoinHandle;

/// Default quiet period before an edit is written to the store
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(600);

/// Session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Quiet period after the last edit before saving
    pub debounce: Duration,
    /// Handling of a pending edit when switching documents
    pub switch_policy: SwitchPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_SAVE_DEBOUNCE,
            switch_policy: SwitchPolicy::Flush,
        }
    }
}

impl SyncConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_switch_policy(mut self, policy: SwitchPolicy) -> Self {
        self.switch_policy = policy;
        self
    }
}

impl From<&EditingSettings> for SyncConfig {
    fn from(settings: &EditingSettings) -> Self {
        Self {
            debounce: Duration::from_millis(settings.save_debounce_ms),
            switch_policy: settings.switch_policy,
        }
    }
}

/// Save state of the bound document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    PendingSave,
    Switching,
}

/// An edit not yet written to the store
#[derive(Debug, Clone)]
struct PendingEdit {
    document_id: DocumentId,
    content: String,
}

/// State shared with debounce tasks
#[derive(Debug)]
struct SessionState {
    state: SyncState,
    bound: Option<DocumentId>,
    pending: Option<PendingEdit>,
    generation: u64,
    stats: DocumentStats,
}

type SharedState = Arc<Mutex<SessionState>>;

fn lock_state(state: &SharedState) -> Result<MutexGuard<'_, SessionState>> {
    state.lock().map_err(|e| SyncError::LockPoisoned(e.to_string()))
}

fn lock_store(store: &SharedStore) -> Result<MutexGuard<'_, DocumentStore>> {
    store.lock().map_err(|e| SyncError::LockPoisoned(e.to_string()))
}

/// Write the pending edit, if any, into the store.
///
/// With `expected_generation` set (a debounce task firing), nothing is written
/// unless the generation is still current. Lock order is session state, then
/// store.
fn commit_pending(
    state: &SharedState,
    store: &SharedStore,
    expected_generation: Option<u64>,
) -> Result<bool> {
    let mut session = lock_state(state)?;
    if expected_generation.is_some_and(|g| g != session.generation) {
        tracing::debug!("stale save task skipped");
        return Ok(false);
    }
    if session.pending.is_none() {
        if session.state == SyncState::PendingSave {
            session.state = SyncState::Idle;
        }
        return Ok(false);
    }

    // The edit stays pending if the store can't be locked
    let mut store = lock_store(store)?;
    let Some(edit) = session.pending.take() else {
        return Ok(false);
    };
    let mode = store
        .get(edit.document_id)
        .map(|doc| doc.mode())
        .unwrap_or_default();
    let stats = DocumentStats::compute_for_mode(&edit.content, mode);
    let written = store.update(
        edit.document_id,
        DocumentPatch::new()
            .content(edit.content)
            .word_count(stats.words),
    );
    drop(store);

    if written {
        tracing::info!(document_id = %edit.document_id, words = stats.words, "saved edit");
    } else {
        tracing::debug!(document_id = %edit.document_id, "document gone, edit dropped");
    }
    if session.bound == Some(edit.document_id) {
        session.stats = stats;
    }
    if session.state == SyncState::PendingSave {
        session.state = SyncState::Idle;
    }
    Ok(written)
}

/// Binds an editing surface to the active document of a shared store
pub struct SyncSession<S: EditingSurface> {
    store: SharedStore,
    surface: S,
    config: SyncConfig,
    state: SharedState,
    timer: Option<JoinHandle<()>>,
}

impl<S: EditingSurface> SyncSession<S> {
    /// Create a session and hydrate the surface from the store's active document
    pub fn new(store: SharedStore, surface: S, config: SyncConfig) -> Result<Self> {
        let mut session = Self {
            store,
            surface,
            config,
            state: Arc::new(Mutex::new(SessionState {
                state: SyncState::Idle,
                bound: None,
                pending: None,
                generation: 0,
                stats: DocumentStats::default(),
            })),
            timer: None,
        };
        session.sync_active()?;
        Ok(session)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Apply new settings; an already scheduled save keeps its old delay
    pub fn set_config(&mut self, config: SyncConfig) {
        self.config = config;
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for the host to deliver user input
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn state(&self) -> SyncState {
        self.state
            .lock()
            .map(|s| s.state)
            .unwrap_or(SyncState::Idle)
    }

    /// Document currently bound to the surface
    pub fn bound_document(&self) -> Option<DocumentId> {
        self.state.lock().ok().and_then(|s| s.bound)
    }

    /// Statistics of the bound document as last saved or hydrated
    pub fn stats(&self) -> DocumentStats {
        self.state.lock().map(|s| s.stats).unwrap_or_default()
    }

    /// Whether an edit is waiting to be saved
    pub fn has_pending_edit(&self) -> bool {
        self.state.lock().map(|s| s.pending.is_some()).unwrap_or(false)
    }

    /// Report that the surface content changed.
    ///
    /// Restarts the debounce window; the latest content is written once the
    /// window elapses without further edits.
    pub fn on_edit(&mut self) -> Result<()> {
        let content = self.surface.content();
        let generation = {
            let mut session = lock_state(&self.state)?;
            let Some(document_id) = session.bound else {
                tracing::debug!("edit ignored: no document bound");
                return Ok(());
            };
            session.generation += 1;
            session.pending = Some(PendingEdit { document_id, content });
            session.state = SyncState::PendingSave;
            session.generation
        };

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let state = self.state.clone();
        let store = self.store.clone();
        let delay = self.config.debounce;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = commit_pending(&state, &store, Some(generation)) {
                tracing::warn!("Debounced save failed: {}", e);
            }
        }));
        tracing::debug!(generation, delay_ms = delay.as_millis() as u64, "save scheduled");
        Ok(())
    }

    /// Cancel the scheduled task so it can never write
    fn cancel_timer(&mut self) -> Result<()> {
        lock_state(&self.state)?.generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        Ok(())
    }

    /// Write a pending edit immediately. Returns true if the store changed.
    pub fn flush(&mut self) -> Result<bool> {
        self.cancel_timer()?;
        commit_pending(&self.state, &self.store, None)
    }

    /// Make `id` the store's active document and bind it
    pub fn open(&mut self, id: DocumentId) -> Result<()> {
        lock_store(&self.store)?.set_active(id);
        self.switch_to(Some(id))
    }

    /// Follow the store's active pointer if it moved away from the bound document
    pub fn sync_active(&mut self) -> Result<()> {
        let active = lock_store(&self.store)?.active_id();
        let bound = lock_state(&self.state)?.bound;
        if active != bound {
            self.switch_to(active)?;
        }
        Ok(())
    }

    /// Bind the surface to another document.
    ///
    /// A pending edit for the previous document is flushed or discarded per
    /// the switch policy before the new content is loaded.
    pub fn switch_to(&mut self, id: Option<DocumentId>) -> Result<()> {
        self.cancel_timer()?;
        let previous = {
            let mut session = lock_state(&self.state)?;
            session.state = SyncState::Switching;
            session.bound
        };

        let result = self.resolve_pending().and_then(|()| self.hydrate(id));
        if let Ok(mut session) = lock_state(&self.state) {
            session.state = if session.pending.is_some() {
                SyncState::PendingSave
            } else {
                SyncState::Idle
            };
        }
        let bound = result?;

        tracing::info!(
            from = ?previous.map(|p| p.to_string()),
            to = ?bound.map(|b| b.to_string()),
            "switched document"
        );
        Ok(())
    }

    /// Flush or drop the pending edit per the switch policy
    fn resolve_pending(&mut self) -> Result<()> {
        match self.config.switch_policy {
            SwitchPolicy::Flush => {
                commit_pending(&self.state, &self.store, None)?;
            }
            SwitchPolicy::Discard => {
                if let Some(edit) = lock_state(&self.state)?.pending.take() {
                    tracing::warn!(
                        document_id = %edit.document_id,
                        bytes = edit.content.len(),
                        "discarding unsaved edit on document switch"
                    );
                }
            }
        }
        Ok(())
    }

    /// Load a document into the surface, normalizing plain-text documents
    /// that still hold markup. Returns the document actually bound.
    fn hydrate(&mut self, id: Option<DocumentId>) -> Result<Option<DocumentId>> {
        let loaded = {
            let mut store = lock_store(&self.store)?;
            match id.and_then(|id| store.get(id)).filter(|doc| doc.is_editable()) {
                None => None,
                Some(doc) => {
                    let id = doc.id();
                    let mode = doc.mode();
                    let mut content = doc.content().to_string();
                    if mode == ContentMode::PlainText && looks_like_markup(&content) {
                        content = rich_to_plain(&content);
                        store.update(id, DocumentPatch::new().content(content.clone()));
                        tracing::info!(document_id = %id, "converted markup to plain text on load");
                    }
                    Some((id, mode, content))
                }
            }
        };

        let (bound, stats) = match loaded {
            Some((id, mode, content)) => {
                self.surface.set_content(&content);
                (Some(id), DocumentStats::compute_for_mode(&content, mode))
            }
            None => {
                self.surface.set_content("");
                (None, DocumentStats::default())
            }
        };

        let mut session = lock_state(&self.state)?;
        session.bound = bound;
        session.stats = stats;
        Ok(bound)
    }

    /// Compare the surface with the store and let the store win on mismatch.
    ///
    /// Skipped while an edit is pending, since the surface is then newer than
    /// the store. Returns true if the surface was overwritten or rebound.
    pub fn resync_from_store(&mut self) -> Result<bool> {
        let bound = {
            let session = lock_state(&self.state)?;
            if session.state != SyncState::Idle || session.pending.is_some() {
                return Ok(false);
            }
            session.bound
        };

        let (exists, stored) = {
            let store = lock_store(&self.store)?;
            match bound.and_then(|id| store.get(id)) {
                Some(doc) => (true, Some((doc.content().to_string(), doc.mode()))),
                None => (false, None),
            }
        };

        if !exists {
            let before = bound;
            self.sync_active()?;
            return Ok(before.is_some() || self.bound_document().is_some());
        }

        let Some((content, mode)) = stored else {
            return Ok(false);
        };
        if mode == ContentMode::PlainText && looks_like_markup(&content) {
            self.switch_to(bound)?;
            return Ok(true);
        }
        if self.surface.content() == content {
            return Ok(false);
        }

        tracing::info!(document_id = ?bound.map(|b| b.to_string()), "surface resynchronized from store");
        self.surface.set_content(&content);
        lock_state(&self.state)?.stats = DocumentStats::compute_for_mode(&content, mode);
        Ok(true)
    }
}

impl<S: EditingSurface> Drop for SyncSession<S> {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush edit on close: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BufferSurface;

    fn session_with_doc(title: &str, content: &str) -> (SyncSession<BufferSurface>, DocumentId) {
        let mut store = DocumentStore::new();
        let id = store.create(None, false);
        store.update(id, DocumentPatch::new().title(title).content(content));
        let session =
            SyncSession::new(store.into_shared(), BufferSurface::new(), SyncConfig::default()).unwrap();
        (session, id)
    }

    #[test]
    fn test_config_from_settings() {
        let settings = EditingSettings {
            save_debounce_ms: 250,
            switch_policy: SwitchPolicy::Discard,
            ..EditingSettings::default()
        };
        let config = SyncConfig::from(&settings);
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.switch_policy, SwitchPolicy::Discard);
        assert_eq!(SyncConfig::default().debounce, DEFAULT_SAVE_DEBOUNCE);
    }

    #[test]
    fn test_new_session_hydrates_active_document() {
        let (session, id) = session_with_doc("essay", "<p>Hello</p>");
        assert_eq!(session.bound_document(), Some(id));
        assert_eq!(session.surface().content(), "<p>Hello</p>");
        assert_eq!(session.state(), SyncState::Idle);
        assert_eq!(session.stats().words, 1);
    }

    #[test]
    fn test_plain_text_hydration_converts_markup_once() {
        let (session, id) = session_with_doc("notes.txt", "<p>first</p><p>second</p>");
        assert_eq!(session.surface().content(), "first\n\nsecond");

        let store = session.store().lock().unwrap();
        assert_eq!(store.get(id).unwrap().content(), "first\n\nsecond");
    }

    #[test]
    fn test_rich_hydration_leaves_content_alone() {
        let (session, id) = session_with_doc("notes.md", "<p>first</p>");
        let store = session.store().lock().unwrap();
        assert_eq!(store.get(id).unwrap().content(), "<p>first</p>");
    }

    #[test]
    fn test_folder_is_never_bound() {
        let mut store = DocumentStore::new();
        let folder = store.create(None, true);
        store.set_active(folder);
        let session =
            SyncSession::new(store.into_shared(), BufferSurface::new(), SyncConfig::default()).unwrap();
        assert_eq!(session.bound_document(), None);
        assert_eq!(session.surface().content(), "");
    }

    #[tokio::test]
    async fn test_edit_without_bound_document_is_ignored() {
        let store = DocumentStore::new().into_shared();
        let mut session = SyncSession::new(store, BufferSurface::new(), SyncConfig::default()).unwrap();
        session.surface_mut().type_text("lost in the void");
        session.on_edit().unwrap();
        assert_eq!(session.state(), SyncState::Idle);
        assert!(!session.has_pending_edit());
    }

    #[tokio::test]
    async fn test_flush_writes_immediately() {
        let (mut session, id) = session_with_doc("draft", "<p></p>");
        session.surface_mut().replace("<p>typed</p>");
        session.on_edit().unwrap();
        assert_eq!(session.state(), SyncState::PendingSave);

        assert!(session.flush().unwrap());
        assert_eq!(session.state(), SyncState::Idle);
        let store = session.store().lock().unwrap();
        let doc = store.get(id).unwrap();
        assert_eq!(doc.content(), "<p>typed</p>");
        assert_eq!(doc.word_count(), Some(1));
    }

    #[tokio::test]
    async fn test_flush_without_pending_is_noop() {
        let (mut session, _) = session_with_doc("draft", "<p></p>");
        assert!(!session.flush().unwrap());
    }

    #[tokio::test]
    async fn test_failed_flush_on_switch_leaves_edit_pending() {
        let (mut session, _) = session_with_doc("draft", "<p></p>");
        session.surface_mut().replace("<p>unsaved</p>");
        session.on_edit().unwrap();

        let store = session.store().clone();
        let _ = std::thread::spawn(move || {
            let _guard = store.lock().unwrap();
            panic!("poison the store lock");
        })
        .join();

        let err = session.switch_to(None).unwrap_err();
        assert!(matches!(err, SyncError::LockPoisoned(_)));
        assert_eq!(session.state(), SyncState::PendingSave);
        assert!(session.has_pending_edit());
    }

    #[test]
    fn test_resync_overwrites_surface_when_store_differs() {
        let (mut session, id) = session_with_doc("draft", "<p>v1</p>");
        session
            .store()
            .lock()
            .unwrap()
            .update(id, DocumentPatch::new().content("<p>v2</p>"));

        assert!(session.resync_from_store().unwrap());
        assert_eq!(session.surface().content(), "<p>v2</p>");
        assert!(!session.resync_from_store().unwrap());
    }
}
