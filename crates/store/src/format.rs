//! Workspace file format
//!
//! The workspace is persisted as one JSON record: a header, the document
//! table keyed by ID, and the active-document pointer. Transient UI state is
//! never part of this record.

use crate::DocumentStore;
use doc_model::{Document, DocumentId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// File format version
pub const FORMAT_VERSION: u32 = 1;

/// File extension for workspace files
pub const FILE_EXTENSION: &str = "folio.json";

/// Default workspace file name inside the app data directory
pub const WORKSPACE_FILE_NAME: &str = "workspace.folio.json";

/// File header for format identification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHeader {
    /// Magic string for format identification
    pub magic: String,
    /// Format version
    pub version: u32,
    /// Creation timestamp (RFC 3339)
    pub created: String,
    /// Last modified timestamp (RFC 3339)
    pub modified: String,
}

impl FileHeader {
    pub const MAGIC: &'static str = "FOLIO-WORKSPACE";

    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            magic: Self::MAGIC.to_string(),
            version: FORMAT_VERSION,
            created: now.clone(),
            modified: now,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == Self::MAGIC && self.version <= FORMAT_VERSION
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete workspace file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceFile {
    pub header: FileHeader,
    pub documents: HashMap<DocumentId, Document>,
    #[serde(default)]
    pub active_document_id: Option<DocumentId>,
}

impl WorkspaceFile {
    /// Snapshot the durable parts of a store
    pub fn from_store(store: &DocumentStore) -> Self {
        Self {
            header: FileHeader::new(),
            documents: store.table().clone(),
            active_document_id: store.active_id(),
        }
    }

    /// Rebuild a store from this file
    pub fn into_store(self) -> DocumentStore {
        DocumentStore::from_parts(self.documents, self.active_document_id)
    }
}
