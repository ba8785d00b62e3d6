//! Headless application commands
//!
//! Each command takes the application state and returns a serializable result
//! or a user-facing error string, ready to be exposed to a frontend.

use crate::state::{lock, AppState, UiFlags};
use assistant::{generate_reply, rewrite_request, CompletionBackend, Provider, RewriteAction};
use content::DocumentStats;
use doc_model::DocumentId;
use serde::{Deserialize, Serialize};
use store::{AppSettings, IntegrityChecker, StoreError, WorkspaceStats};

fn parse_id(id: &str) -> Result<DocumentId, String> {
    id.parse().map_err(|e: doc_model::DocModelError| e.to_string())
}

fn parse_parent(parent: Option<&str>) -> Result<Option<DocumentId>, String> {
    parent.map(parse_id).transpose()
}

// =============================================================================
// Sidebar
// =============================================================================

/// One row of the document sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarEntry {
    pub id: String,
    pub title: String,
    pub is_folder: bool,
    /// Nesting level, 0 at the root
    pub depth: usize,
    /// Word badge, recomputed from content; `None` for folders
    pub words: Option<usize>,
    pub is_active: bool,
}

/// Depth-first listing of the document tree
pub fn list_sidebar(state: &AppState) -> Result<Vec<SidebarEntry>, String> {
    let store = lock(&state.store).map_err(|e| e.to_string())?;
    let active = store.active_id();

    let mut entries = Vec::with_capacity(store.len());
    let mut stack: Vec<(DocumentId, usize)> = store
        .children(None)
        .iter()
        .rev()
        .map(|doc| (doc.id(), 0))
        .collect();

    while let Some((id, depth)) = stack.pop() {
        let Some(doc) = store.get(id) else { continue };
        entries.push(SidebarEntry {
            id: id.to_string(),
            title: doc.title().to_string(),
            is_folder: doc.is_folder(),
            depth,
            words: (!doc.is_folder()).then(|| DocumentStats::for_document(doc).words),
            is_active: active == Some(id),
        });
        if doc.is_folder() {
            stack.extend(store.children(Some(id)).iter().rev().map(|child| (child.id(), depth + 1)));
        }
    }

    Ok(entries)
}

// =============================================================================
// Document commands
// =============================================================================

/// Create a document or folder; new documents are opened in the editor
pub fn create_document(state: &AppState, parent: Option<&str>, is_folder: bool) -> Result<String, String> {
    let parent = parse_parent(parent)?;
    let mut session = lock(&state.session).map_err(|e| e.to_string())?;

    let id = {
        let mut store = lock(&state.store).map_err(|e| e.to_string())?;
        if let Some(parent) = parent {
            match store.get(parent) {
                Some(doc) if doc.is_folder() => {}
                Some(_) => return Err(StoreError::NotAFolder(parent).to_string()),
                None => return Err(StoreError::NotFound(parent).to_string()),
            }
        }
        store.create(parent, is_folder)
    };

    if !is_folder {
        session.sync_active().map_err(|e| e.to_string())?;
    }
    Ok(id.to_string())
}

/// Rename a document; the editor reloads it when the rename changes its mode
pub fn rename_document(state: &AppState, id: &str, title: &str) -> Result<(), String> {
    let id = parse_id(id)?;
    let mut session = lock(&state.session).map_err(|e| e.to_string())?;
    session.flush().map_err(|e| e.to_string())?;

    let (renamed, mode_changed) = {
        let mut store = lock(&state.store).map_err(|e| e.to_string())?;
        let before = store.get(id).map(|doc| doc.mode());
        let renamed = store.rename(id, title);
        let after = store.get(id).map(|doc| doc.mode());
        (renamed, before != after)
    };
    if !renamed {
        return Err(StoreError::NotFound(id).to_string());
    }

    if mode_changed && session.bound_document() == Some(id) {
        session.switch_to(Some(id)).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Move a document under a folder, or to the root
pub fn move_document(state: &AppState, id: &str, parent: Option<&str>) -> Result<(), String> {
    let id = parse_id(id)?;
    let parent = parse_parent(parent)?;
    let mut store = lock(&state.store).map_err(|e| e.to_string())?;
    store.move_document(id, parent).map_err(|e| e.to_string())
}

/// Delete a document and its descendants. Returns the removed IDs.
pub fn delete_document(state: &AppState, id: &str) -> Result<Vec<String>, String> {
    let id = parse_id(id)?;
    let mut session = lock(&state.session).map_err(|e| e.to_string())?;
    let removed = lock(&state.store).map_err(|e| e.to_string())?.delete(id);
    session.sync_active().map_err(|e| e.to_string())?;
    Ok(removed.into_iter().map(|id| id.to_string()).collect())
}

/// Bind the editor to a document
pub fn open_document(state: &AppState, id: &str) -> Result<(), String> {
    let id = parse_id(id)?;
    let mut session = lock(&state.session).map_err(|e| e.to_string())?;
    session.open(id).map_err(|e| e.to_string())
}

/// Content shown in the editor
pub fn get_editor_content(state: &AppState) -> Result<String, String> {
    use edit_engine::EditingSurface;
    let session = lock(&state.session).map_err(|e| e.to_string())?;
    Ok(session.surface().content())
}

/// Replace the editor content as if the user typed it.
/// Must be called from within a Tokio runtime.
pub fn edit_active(state: &AppState, content: &str) -> Result<(), String> {
    let mut session = lock(&state.session).map_err(|e| e.to_string())?;
    session.surface_mut().replace(content);
    session.on_edit().map_err(|e| e.to_string())
}

/// Statistics of the document in the editor
pub fn get_active_stats(state: &AppState) -> Result<Option<DocumentStats>, String> {
    let session = lock(&state.session).map_err(|e| e.to_string())?;
    Ok(session.bound_document().map(|_| session.stats()))
}

/// Totals across the whole workspace
pub fn get_workspace_stats(state: &AppState) -> Result<WorkspaceStats, String> {
    let store = lock(&state.store).map_err(|e| e.to_string())?;
    Ok(IntegrityChecker::new().compute_stats(&store))
}

/// Write the workspace to disk
pub async fn save_workspace(state: &AppState) -> Result<bool, String> {
    state.save().await.map_err(|e| e.to_string())
}

// =============================================================================
// Settings commands
// =============================================================================

/// Get current application settings
pub fn get_settings(state: &AppState) -> Result<AppSettings, String> {
    state.settings.snapshot().map_err(|e| e.to_string())
}

/// Update application settings and apply editing changes to the session
pub fn update_settings(state: &AppState, settings: AppSettings) -> Result<(), String> {
    let config = edit_engine::SyncConfig::from(&settings.editing);
    {
        let mut manager = lock(&state.settings.manager).map_err(|e| e.to_string())?;
        manager.update_sync(settings).map_err(|e| e.to_string())?;
    }
    lock(&state.session).map_err(|e| e.to_string())?.set_config(config);
    Ok(())
}

/// Reset settings to defaults
pub fn reset_settings(state: &AppState) -> Result<AppSettings, String> {
    let settings = {
        let mut manager = lock(&state.settings.manager).map_err(|e| e.to_string())?;
        manager.reset_sync().map_err(|e| e.to_string())?.clone()
    };
    lock(&state.session)
        .map_err(|e| e.to_string())?
        .set_config(edit_engine::SyncConfig::from(&settings.editing));
    Ok(settings)
}

// =============================================================================
// View commands
// =============================================================================

pub fn get_ui_flags(state: &AppState) -> Result<UiFlags, String> {
    Ok(*lock(&state.ui).map_err(|e| e.to_string())?)
}

pub fn toggle_zen_mode(state: &AppState) -> Result<bool, String> {
    let mut ui = lock(&state.ui).map_err(|e| e.to_string())?;
    ui.zen_mode = !ui.zen_mode;
    Ok(ui.zen_mode)
}

pub fn toggle_sidebar(state: &AppState) -> Result<bool, String> {
    let mut ui = lock(&state.ui).map_err(|e| e.to_string())?;
    ui.sidebar_visible = !ui.sidebar_visible;
    Ok(ui.sidebar_visible)
}

// =============================================================================
// Assistant commands
// =============================================================================

/// Assistant failure as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantErrorDto {
    pub message: String,
    /// The user should fix their provider settings
    pub needs_configuration: bool,
    /// Retrying later may succeed
    pub transient: bool,
}

impl From<assistant::AssistantError> for AssistantErrorDto {
    fn from(e: assistant::AssistantError) -> Self {
        Self {
            message: e.to_string(),
            needs_configuration: e.is_configuration(),
            transient: e.is_transient(),
        }
    }
}

/// Rewrite `selection` with the configured provider
pub async fn rewrite_selection<B>(
    state: &AppState,
    backend: &B,
    action: RewriteAction,
    selection: &str,
) -> Result<String, AssistantErrorDto>
where
    B: CompletionBackend + ?Sized,
{
    let settings = state.settings.snapshot().map_err(|e| AssistantErrorDto {
        message: e.to_string(),
        needs_configuration: false,
        transient: false,
    })?;
    let provider: Provider = settings.assistant.provider.parse()?;

    let mut request = rewrite_request(
        action,
        selection,
        provider,
        settings.assistant.api_key.unwrap_or_default(),
    );
    request.model = settings.assistant.model;

    tracing::info!(%provider, ?action, "Running rewrite");
    Ok(generate_reply(backend, &request).await?)
}
