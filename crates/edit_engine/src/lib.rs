//! Edit Engine - Keeping an editing surface and the document store in sync
//!
//! A [`SyncSession`] binds one editing surface to the active document of a
//! shared [`store::DocumentStore`]. Edits are coalesced by a cancellable
//! debounce task before being written back; switching documents resolves any
//! pending edit according to the configured [`SwitchPolicy`] and re-hydrates
//! the surface.
//!
//! Sessions schedule their debounce tasks with `tokio::spawn`, so edits must
//! be reported from within a Tokio runtime.

mod error;
mod session;
mod surface;

pub use error::*;
pub use session::*;
pub use surface::*;

pub use store::SwitchPolicy;
