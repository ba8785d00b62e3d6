//! Application settings management
//!
//! This module provides settings persistence, loading, and updating
//! for the Folio application. Session-only UI flags (zen mode, panel
//! visibility) are deliberately not part of these settings.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application settings container
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    /// General application settings
    #[serde(default)]
    pub general: GeneralSettings,
    /// Editing and saving behavior
    #[serde(default)]
    pub editing: EditingSettings,
    /// AI assistant provider settings
    #[serde(default)]
    pub assistant: AssistantSettings,
}

/// General application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    /// Application theme
    pub theme: Theme,
}

/// What happens to an unsaved edit when the user switches documents
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SwitchPolicy {
    /// Write the pending edit to the previous document before switching
    #[default]
    Flush,
    /// Drop the pending edit
    Discard,
}

/// Editing and saving settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditingSettings {
    /// Quiet period after the last keystroke before content is saved (ms)
    pub save_debounce_ms: u64,
    /// Handling of unsaved edits on document switch
    pub switch_policy: SwitchPolicy,
    /// Whether the workspace is autosaved to disk
    pub autosave_enabled: bool,
    /// Autosave interval in seconds
    pub autosave_interval_secs: u64,
}

impl Default for EditingSettings {
    fn default() -> Self {
        Self {
            save_debounce_ms: 600,
            switch_policy: SwitchPolicy::Flush,
            autosave_enabled: true,
            autosave_interval_secs: 30,
        }
    }
}

/// AI assistant settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantSettings {
    /// Provider name (e.g., "openai", "anthropic", "gemini", "groq")
    pub provider: String,
    /// Model override; the provider default is used when absent
    pub model: Option<String>,
    /// API key for the selected provider
    pub api_key: Option<String>,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            api_key: None,
        }
    }
}

/// Application theme
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Settings manager for loading, saving, and updating application settings
pub struct SettingsManager {
    /// Path to the settings file
    settings_path: PathBuf,
    /// Current settings (cached)
    current: AppSettings,
}

impl SettingsManager {
    /// Create a new settings manager with the given app data directory
    pub fn new(app_data_dir: PathBuf) -> Self {
        let settings_path = app_data_dir.join("settings.json");
        Self {
            settings_path,
            current: AppSettings::default(),
        }
    }

    /// Get the path to the settings file
    pub fn settings_path(&self) -> &PathBuf {
        &self.settings_path
    }

    fn apply_loaded(&mut self, content: &str) {
        match serde_json::from_str::<AppSettings>(content) {
            Ok(settings) => {
                self.current = settings;
            }
            Err(e) => {
                tracing::warn!("Failed to parse settings file, using defaults: {}", e);
                self.current = AppSettings::default();
            }
        }
    }

    /// Load settings from disk, or return defaults if file doesn't exist
    pub async fn load(&mut self) -> Result<&AppSettings> {
        if self.settings_path.exists() {
            let content = tokio::fs::read_to_string(&self.settings_path).await?;
            self.apply_loaded(&content);
        } else {
            self.current = AppSettings::default();
        }
        Ok(&self.current)
    }

    /// Load settings synchronously (for use during app startup)
    pub fn load_sync(&mut self) -> Result<&AppSettings> {
        if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            self.apply_loaded(&content);
        } else {
            self.current = AppSettings::default();
        }
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        tokio::fs::write(&self.settings_path, content).await?;
        Ok(())
    }

    /// Save settings synchronously
    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &AppSettings {
        &self.current
    }

    /// Update settings and save to disk
    pub async fn update(&mut self, settings: AppSettings) -> Result<()> {
        self.current = settings;
        self.save().await
    }

    /// Update settings synchronously
    pub fn update_sync(&mut self, settings: AppSettings) -> Result<()> {
        self.current = settings;
        self.save_sync()
    }

    /// Reset settings to defaults synchronously
    pub fn reset_sync(&mut self) -> Result<&AppSettings> {
        self.current = AppSettings::default();
        self.save_sync()?;
        Ok(&self.current)
    }

    /// Update only editing settings
    pub async fn update_editing(&mut self, editing: EditingSettings) -> Result<()> {
        self.current.editing = editing;
        self.save().await
    }

    /// Update only assistant settings
    pub async fn update_assistant(&mut self, assistant: AssistantSettings) -> Result<()> {
        self.current.assistant = assistant;
        self.save().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();

        assert_eq!(settings.general.theme, Theme::System);
        assert_eq!(settings.editing.save_debounce_ms, 600);
        assert_eq!(settings.editing.switch_policy, SwitchPolicy::Flush);
        assert!(settings.editing.autosave_enabled);
        assert_eq!(settings.assistant.provider, "openai");
        assert!(settings.assistant.api_key.is_none());
    }

    #[test]
    fn test_settings_serialization_roundtrip() {
        let settings = AppSettings::default();
        let json = serde_json::to_string_pretty(&settings).unwrap();
        let parsed: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, parsed);
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        assert_eq!(serde_json::to_string(&SwitchPolicy::Discard).unwrap(), "\"discard\"");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: AppSettings = serde_json::from_str(r#"{"general":{"theme":"light"}}"#).unwrap();
        assert_eq!(parsed.general.theme, Theme::Light);
        assert_eq!(parsed.editing, EditingSettings::default());
    }

    #[test]
    fn test_settings_manager_load_save_sync() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::new(temp_dir.path().to_path_buf());

        // Load should return defaults when no file exists
        let settings = manager.load_sync().unwrap();
        assert_eq!(settings, &AppSettings::default());

        let mut new_settings = AppSettings::default();
        new_settings.general.theme = Theme::Dark;
        new_settings.editing.switch_policy = SwitchPolicy::Discard;
        manager.update_sync(new_settings).unwrap();

        let mut manager2 = SettingsManager::new(temp_dir.path().to_path_buf());
        let loaded = manager2.load_sync().unwrap();
        assert_eq!(loaded.general.theme, Theme::Dark);
        assert_eq!(loaded.editing.switch_policy, SwitchPolicy::Discard);
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("settings.json"), "{ not json").unwrap();

        let mut manager = SettingsManager::new(temp_dir.path().to_path_buf());
        assert_eq!(manager.load_sync().unwrap(), &AppSettings::default());
    }

    #[test]
    fn test_settings_manager_reset_sync() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::new(temp_dir.path().to_path_buf());

        let mut new_settings = AppSettings::default();
        new_settings.editing.save_debounce_ms = 250;
        manager.update_sync(new_settings).unwrap();

        let settings = manager.reset_sync().unwrap();
        assert_eq!(settings.editing.save_debounce_ms, 600);
    }

    #[tokio::test]
    async fn test_settings_manager_async() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::new(temp_dir.path().to_path_buf());

        manager.load().await.unwrap();

        manager
            .update_assistant(AssistantSettings {
                provider: "anthropic".to_string(),
                model: Some("claude-3-5-haiku-latest".to_string()),
                api_key: Some("sk-test".to_string()),
            })
            .await
            .unwrap();

        let mut manager2 = SettingsManager::new(temp_dir.path().to_path_buf());
        let loaded = manager2.load().await.unwrap();
        assert_eq!(loaded.assistant.provider, "anthropic");
        assert_eq!(loaded.assistant.api_key.as_deref(), Some("sk-test"));
    }
}
