//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Anything that touches the disk (open, save, rename) runs in the
//! side-effect handler after `update`, against the app's [`FileGateway`].

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, Prompt, PromptKind, ToastLevel};
pub use update::{Message, update, update_at};

use std::path::PathBuf;
use std::sync::Arc;

use crate::gateway::{DiskGateway, FileGateway};
use crate::pane::DEFAULT_SPLIT_PERCENT;
use crate::session::SessionConfig;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file: Option<PathBuf>,
    session_config: SessionConfig,
    split_percent: f64,
    preview_only: bool,
    gateway: Arc<dyn FileGateway>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create an application with an empty, unsaved document on the real
    /// filesystem.
    pub fn new() -> Self {
        Self {
            file: None,
            session_config: SessionConfig::default(),
            split_percent: DEFAULT_SPLIT_PERCENT,
            preview_only: false,
            gateway: Arc::new(DiskGateway),
        }
    }

    /// Start with this file open. A path that does not exist yet is
    /// created on the first save.
    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    /// Render and auto-save delays.
    pub const fn with_session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Initial editor width in percent.
    pub const fn with_split_percent(mut self, percent: f64) -> Self {
        self.split_percent = percent;
        self
    }

    /// Start with only the preview visible.
    pub const fn with_preview_only(mut self, preview_only: bool) -> Self {
        self.preview_only = preview_only;
        self
    }

    /// Use a different file backend.
    pub fn with_gateway(mut self, gateway: Arc<dyn FileGateway>) -> Self {
        self.gateway = gateway;
        self
    }
}

#[cfg(test)]
mod tests;
