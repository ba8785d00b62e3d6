//! Workspace file I/O

use crate::{DocumentStore, Result, StoreError};
use std::path::{Path, PathBuf};

/// Sibling path used for write-then-rename saves
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write serialized JSON next to `path`, then rename it into place
pub(crate) async fn write_json_atomic(path: &Path, json: String) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Save a workspace to a file
pub async fn save_workspace(store: &DocumentStore, path: impl AsRef<Path>) -> Result<()> {
    let json = crate::serialize_workspace(store)?;
    write_json_atomic(path.as_ref(), json).await
}

/// Load a workspace from a file
pub async fn load_workspace(path: impl AsRef<Path>) -> Result<DocumentStore> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StoreError::FileNotFound(path.display().to_string()));
    }

    let json = tokio::fs::read_to_string(path).await?;
    crate::deserialize_workspace(&json)
}

/// Save a workspace synchronously
pub fn save_workspace_sync(store: &DocumentStore, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = crate::serialize_workspace(store)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = temp_path(path);
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Load a workspace synchronously
pub fn load_workspace_sync(path: impl AsRef<Path>) -> Result<DocumentStore> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StoreError::FileNotFound(path.display().to_string()));
    }

    let json = std::fs::read_to_string(path)?;
    crate::deserialize_workspace(&json)
}
