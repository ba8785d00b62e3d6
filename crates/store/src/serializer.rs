//! Workspace serialization

use crate::{DocumentStore, Result, StoreError, WorkspaceFile};

/// Serialize a store's durable state to JSON
pub fn serialize_workspace(store: &DocumentStore) -> Result<String> {
    let file = WorkspaceFile::from_store(store);
    let json = serde_json::to_string_pretty(&file)?;
    Ok(json)
}

/// Deserialize a store from JSON
pub fn deserialize_workspace(json: &str) -> Result<DocumentStore> {
    let file: WorkspaceFile = serde_json::from_str(json)?;

    if !file.header.is_valid() {
        return Err(StoreError::InvalidFormat(format!(
            "Invalid or unsupported workspace: {} v{}",
            file.header.magic, file.header.version
        )));
    }

    Ok(file.into_store())
}
