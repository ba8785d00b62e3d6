//! Error types for document model operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Invalid document ID: {0}")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
