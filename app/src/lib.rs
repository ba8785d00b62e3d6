//! Folio application shell: state wiring and headless commands

pub mod commands;
pub mod state;

pub use state::{AppState, UiFlags};
