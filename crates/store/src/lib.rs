//! Store - Document table, persistence, autosave, and settings
//!
//! This crate owns the authoritative document table and everything needed
//! to keep it durable: workspace serialization, file I/O, debounced
//! autosave, integrity checking, and application settings.

mod autosave;
mod document_store;
mod error;
mod file_io;
mod format;
mod integrity;
mod serializer;
mod settings;

pub use autosave::*;
pub use document_store::*;
pub use error::*;
pub use file_io::*;
pub use format::*;
pub use integrity::*;
pub use serializer::*;
pub use settings::*;
