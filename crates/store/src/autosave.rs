//! Autosave of the shared workspace with debouncing and background saving
//!
//! The manager watches the store's revision counter. Once the revision has
//! stayed unchanged for the debounce period, the workspace is written to its
//! file; a background task repeats the check on a fixed interval.

use crate::{Result, SharedStore, StoreError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Autosave configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Whether autosave is enabled
    pub enabled: bool,
    /// Interval between autosave checks in seconds
    pub interval_secs: u64,
    /// Quiet period after the last change before saving (in milliseconds)
    pub debounce_ms: u64,
    /// Workspace file to write
    pub path: PathBuf,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            debounce_ms: 1000,
            path: PathBuf::from(crate::WORKSPACE_FILE_NAME),
        }
    }
}

impl AutosaveConfig {
    /// Create a new config with custom interval
    pub fn with_interval(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    /// Create a new config with custom debounce
    pub fn with_debounce(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Create a new config writing to a custom path
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Create a new config with autosave disabled
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Current autosave status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveStatus {
    /// Whether autosave is enabled
    pub enabled: bool,
    /// Whether the store has changes not yet written
    pub has_unsaved_changes: bool,
    /// Whether a save is currently in progress
    pub is_saving: bool,
    /// Timestamp of last successful save (Unix timestamp in ms)
    pub last_save_time: Option<u64>,
    /// Error message from last save attempt (if any)
    pub last_error: Option<String>,
}

/// Autosave manager for a shared workspace store
pub struct AutosaveManager {
    /// Configuration
    config: AutosaveConfig,
    /// Store being persisted
    store: SharedStore,
    /// Store revision written by the last successful save
    saved_revision: AtomicU64,
    /// Latest revision seen and when it was first seen
    last_observed: Mutex<Option<(u64, Instant)>>,
    /// Last successful save time (Unix timestamp in ms)
    last_save_time: AtomicU64,
    /// Whether a save is in progress
    is_saving: AtomicBool,
    /// Last error message
    last_error: RwLock<Option<String>>,
}

impl AutosaveManager {
    /// Create a new autosave manager. The store's current revision is
    /// treated as already saved.
    pub fn new(store: SharedStore, config: AutosaveConfig) -> Result<Self> {
        let revision = lock_store(&store)?.revision();
        Ok(Self {
            config,
            store,
            saved_revision: AtomicU64::new(revision),
            last_observed: Mutex::new(None),
            last_save_time: AtomicU64::new(0),
            is_saving: AtomicBool::new(false),
            last_error: RwLock::new(None),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &AutosaveConfig {
        &self.config
    }

    /// Check if the store has unsaved changes
    pub fn is_dirty(&self) -> bool {
        lock_store(&self.store)
            .map(|store| store.revision() != self.saved_revision.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Check if a save is in progress
    pub fn is_saving(&self) -> bool {
        self.is_saving.load(Ordering::SeqCst)
    }

    /// Get the current autosave status
    pub async fn status(&self) -> AutosaveStatus {
        let last_save = self.last_save_time.load(Ordering::SeqCst);
        AutosaveStatus {
            enabled: self.config.enabled,
            has_unsaved_changes: self.is_dirty(),
            is_saving: self.is_saving(),
            last_save_time: if last_save > 0 { Some(last_save) } else { None },
            last_error: self.last_error.read().await.clone(),
        }
    }

    /// Check if the debounce period has passed since the last change
    fn should_save_now(&self) -> Result<bool> {
        if !self.config.enabled {
            return Ok(false);
        }

        let revision = lock_store(&self.store)?.revision();
        if revision == self.saved_revision.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let mut observed = self
            .last_observed
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        let now = Instant::now();
        match *observed {
            Some((seen, since)) if seen == revision => {
                Ok(now.duration_since(since) >= Duration::from_millis(self.config.debounce_ms))
            }
            _ => {
                *observed = Some((revision, now));
                Ok(self.config.debounce_ms == 0)
            }
        }
    }

    /// Perform an autosave if dirty and the debounce period has passed.
    /// Returns true if a save was performed.
    pub async fn autosave(&self) -> Result<bool> {
        if !self.should_save_now()? {
            return Ok(false);
        }
        self.save_now().await
    }

    /// Write the workspace immediately if it has unsaved changes.
    /// Returns true if a save was performed.
    pub async fn save_now(&self) -> Result<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }

        // Check if already saving
        if self.is_saving.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        let result = self.write_snapshot().await;
        self.is_saving.store(false, Ordering::SeqCst);

        match result {
            Ok(revision) => {
                self.saved_revision.store(revision, Ordering::SeqCst);
                self.last_save_time.store(now_millis(), Ordering::SeqCst);
                *self.last_error.write().await = None;
                tracing::info!(revision, path = %self.config.path.display(), "workspace autosaved");
                Ok(true)
            }
            Err(e) => {
                *self.last_error.write().await = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Serialize under the lock, then write without holding it
    async fn write_snapshot(&self) -> Result<u64> {
        let (json, revision) = {
            let store = lock_store(&self.store)?;
            (crate::serialize_workspace(&store)?, store.revision())
        };

        crate::file_io::write_json_atomic(&self.config.path, json).await?;
        Ok(revision)
    }

    /// Start the autosave background task.
    /// Abort the returned handle to stop it.
    pub fn start_background_task(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let manager = self;

        tokio::spawn(async move {
            let interval = Duration::from_secs(manager.config.interval_secs.max(1));

            loop {
                tokio::time::sleep(interval).await;

                if let Err(e) = manager.autosave().await {
                    tracing::warn!("Autosave failed: {}", e);
                }
            }
        })
    }
}

fn lock_store(store: &SharedStore) -> Result<std::sync::MutexGuard<'_, crate::DocumentStore>> {
    store.lock().map_err(|e| StoreError::LockPoisoned(e.to_string()))
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
