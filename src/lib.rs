// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. pane::PaneSplit)
    clippy::module_name_repetitions
)]

//! # marksplit
//!
//! A terminal markdown editor with a live side-by-side preview.
//!
//! The window is split into a plain-text editor on the left and a rendered
//! preview on the right:
//! - The preview re-renders once typing pauses
//! - Scrolling either pane keeps the other at the same relative position
//! - The divider can be dragged, and the editor hidden entirely
//! - Saved files are auto-saved after a quiet period
//!
//! ## Architecture
//!
//! marksplit uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! File I/O runs after `update` as a side effect, with writes handed to a
//! background worker so the editor never blocks on the disk.
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`session`]: The open document, its dirty flag and timers
//! - [`editor`]: Rope-backed text buffer with a cursor
//! - [`render`]: Markdown to HTML and to preview lines
//! - [`pane`]: Scroll synchronisation and the resizable split
//! - [`gateway`]: File access and the save worker
//! - [`command`]: User commands and their key bindings
//! - [`ui`]: Terminal UI components
//! - [`highlight`]: Syntax highlighting
//! - [`config`]: Startup defaults

pub mod app;
pub mod command;
pub mod config;
pub mod editor;
pub mod gateway;
pub mod highlight;
pub mod pane;
pub mod render;
pub mod session;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::editor::EditorBuffer;
    pub use crate::render::{Preview, Rendered};
    pub use crate::session::DocumentSession;
}
