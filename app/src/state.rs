//! Application state management

use anyhow::Context;
use content::DocumentStats;
use doc_model::DocumentPatch;
use edit_engine::{BufferSurface, SyncConfig, SyncSession};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use store::{
    load_workspace_sync, AppSettings, AutosaveConfig, AutosaveManager, DocumentStore,
    EditingSettings, IntegrityChecker, SettingsManager, SharedStore, StoreError,
    WorkspaceRepairer, WORKSPACE_FILE_NAME,
};
use tokio::task::JoinHandle;

/// Title of the document seeded into an empty workspace
pub const WELCOME_TITLE: &str = "Welcome";

const WELCOME_CONTENT: &str = "<h1>Welcome to Folio</h1>\
<p>Use the sidebar to create documents and folders. A document whose title ends in .txt is edited as plain text.</p>\
<p>Select some text and ask the assistant to improve, shorten or expand it.</p>";

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> anyhow::Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| anyhow::anyhow!("state lock poisoned: {}", e))
}

/// Settings state wrapper for thread-safe access
pub struct SettingsState {
    pub manager: Mutex<SettingsManager>,
}

impl SettingsState {
    /// Create a new settings state with the given app data directory
    pub fn new(app_data_dir: PathBuf) -> Self {
        let mut manager = SettingsManager::new(app_data_dir);
        if let Err(e) = manager.load_sync() {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
        }
        Self {
            manager: Mutex::new(manager),
        }
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> anyhow::Result<AppSettings> {
        Ok(lock(&self.manager)?.get().clone())
    }
}

/// Transient view flags; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiFlags {
    pub zen_mode: bool,
    pub sidebar_visible: bool,
}

impl Default for UiFlags {
    fn default() -> Self {
        Self {
            zen_mode: false,
            sidebar_visible: true,
        }
    }
}

/// Global application state
pub struct AppState {
    pub settings: SettingsState,
    pub store: SharedStore,
    /// Editing session bound to the active document
    pub session: Mutex<SyncSession<BufferSurface>>,
    pub autosave: Arc<AutosaveManager>,
    pub ui: Mutex<UiFlags>,
    workspace_path: PathBuf,
}

impl AppState {
    /// Load settings and the workspace from `data_dir`, repairing and seeding
    /// the workspace as needed
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let settings = SettingsState::new(data_dir.to_path_buf());
        let editing = settings.snapshot()?.editing;

        let workspace_path = data_dir.join(WORKSPACE_FILE_NAME);
        let store = load_or_create(&workspace_path)?.into_shared();

        let autosave = Arc::new(AutosaveManager::new(
            store.clone(),
            autosave_config(&editing, workspace_path.clone()),
        )?);

        repair_workspace(&store)?;
        seed_welcome(&store)?;

        let session = SyncSession::new(store.clone(), BufferSurface::new(), SyncConfig::from(&editing))?;

        Ok(Self {
            settings,
            store,
            session: Mutex::new(session),
            autosave,
            ui: Mutex::new(UiFlags::default()),
            workspace_path,
        })
    }

    pub fn workspace_path(&self) -> &Path {
        &self.workspace_path
    }

    /// Flush the pending edit and write the workspace if it changed
    pub async fn save(&self) -> anyhow::Result<bool> {
        lock(&self.session)?.flush()?;
        let saved = self.autosave.save_now().await?;
        Ok(saved)
    }

    /// Spawn the periodic autosave task. Returns `None` when autosave is
    /// turned off in the settings the workspace was opened with.
    pub fn start_autosave(&self) -> Option<JoinHandle<()>> {
        let config = self.autosave.config();
        if !config.enabled {
            tracing::info!("Autosave disabled");
            return None;
        }
        tracing::info!(interval_secs = config.interval_secs, "Starting autosave task");
        Some(self.autosave.clone().start_background_task())
    }
}

fn autosave_config(editing: &EditingSettings, path: PathBuf) -> AutosaveConfig {
    let config = if editing.autosave_enabled {
        AutosaveConfig::default().with_interval(editing.autosave_interval_secs)
    } else {
        AutosaveConfig::disabled()
    };
    config.with_path(path)
}

fn load_or_create(path: &Path) -> anyhow::Result<DocumentStore> {
    match load_workspace_sync(path) {
        Ok(store) => {
            tracing::info!(documents = store.len(), "Loaded workspace from {:?}", path);
            Ok(store)
        }
        Err(StoreError::FileNotFound(_)) => {
            tracing::info!("No workspace at {:?}, starting empty", path);
            Ok(DocumentStore::new())
        }
        Err(e) => Err(e).with_context(|| format!("failed to load workspace {}", path.display())),
    }
}

fn repair_workspace(store: &SharedStore) -> anyhow::Result<()> {
    let mut store = lock(store)?;
    let report = IntegrityChecker::new().check(&store);
    if report.issues.is_empty() {
        return Ok(());
    }

    tracing::warn!(issues = report.issues.len(), "Workspace integrity issues found");
    let actions = WorkspaceRepairer::new().repair(&mut store, &report.issues);
    for action in &actions {
        tracing::info!("Repair: {:?}", action);
    }
    Ok(())
}

/// Create the welcome document when the workspace is empty.
/// Returns true if a document was created.
pub(crate) fn seed_welcome(store: &SharedStore) -> anyhow::Result<bool> {
    let mut store = lock(store)?;
    if !store.is_empty() {
        return Ok(false);
    }

    let id = store.create(None, false);
    let words = DocumentStats::compute(WELCOME_CONTENT).words;
    store.update(
        id,
        DocumentPatch::new()
            .title(WELCOME_TITLE)
            .content(WELCOME_CONTENT)
            .word_count(words),
    );
    tracing::info!(%id, "Seeded welcome document");
    Ok(true)
}
