//! Error types for storage operations

use doc_model::DocumentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Store lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error("Document {0} is not a folder")]
    NotAFolder(DocumentId),

    #[error("Moving {id} under {parent} would create a cycle")]
    CycleDetected { id: DocumentId, parent: DocumentId },
}

pub type Result<T> = std::result::Result<T, StoreError>;
