//! Document Model - Document records and identifiers
//!
//! This crate provides the foundational data model for the editor: the
//! document record stored in the workspace table, its stable identifier,
//! partial-update patches, and the title-extension rule that decides whether
//! a document's content is rich markup or plain text.

mod document;
mod document_id;
mod error;
mod mode;

pub use document::*;
pub use document_id::*;
pub use error::*;
pub use mode::*;
