//! Content - Conversion and statistics for document content
//!
//! Documents store either rich markup or plain text, selected by the title
//! extension (see [`doc_model::ContentMode`]). This crate converts between the
//! two encodings and derives the statistics shown in the status bar and
//! sidebar badges.
//!
//! # Example
//!
//! ```rust
//! use content::{plain_to_rich, rich_to_plain, DocumentStats};
//!
//! let rich = plain_to_rich("Hello\nworld");
//! assert_eq!(rich, "<p>Hello<br>world</p>");
//! assert_eq!(rich_to_plain(&rich), "Hello\nworld");
//!
//! let stats = DocumentStats::compute(&rich);
//! assert_eq!(stats.words, 2);
//! ```

mod convert;
mod escape;
mod health;
mod stats;

pub use convert::*;
pub use escape::*;
pub use health::*;
pub use stats::*;

pub use doc_model::{extension_of, ContentMode};
