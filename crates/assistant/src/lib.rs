//! Assistant - AI text generation for the editor
//!
//! The network transport is abstracted behind [`CompletionBackend`]; this
//! crate owns request validation, the single rate-limit retry and the
//! rewrite actions offered on a text selection.
//!
//! # Example
//!
//! ```ignore
//! use assistant::{generate_reply, GenerationRequest, Provider};
//!
//! let request = GenerationRequest::new(Provider::OpenAi, api_key, "Say hi");
//! let reply = generate_reply(&backend, &request).await?;
//! ```

mod backend;
mod error;
mod provider;
mod request;
mod retry;
mod rewrite;

pub use backend::*;
pub use error::*;
pub use provider::*;
pub use request::*;
pub use retry::*;
pub use rewrite::*;
