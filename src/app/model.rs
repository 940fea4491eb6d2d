use std::path::Path;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::text::Line;

use crate::pane::{Pane, PaneSplit, ScrollMetrics, ScrollSync, SplitLayout};
use crate::render::Preview;
use crate::session::{DocumentSession, SessionConfig};

/// How long a toast stays on the status row.
const TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// What a modal prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Open,
    SaveAs,
    Rename,
}

impl PromptKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Open => "Open file",
            Self::SaveAs => "Save as",
            Self::Rename => "Rename file",
        }
    }
}

/// A one-line text prompt. Esc cancels it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub fn new(kind: PromptKind, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
        }
    }
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// The open document and its timers
    pub session: DocumentSession,
    /// Latest successful render of the buffer
    pub preview: Preview,
    /// Editor/preview width split
    pub split: PaneSplit,
    /// Keeps the two panes at the same relative position
    pub scroll_sync: ScrollSync,
    /// First buffer line shown in the editor
    pub editor_offset: usize,
    /// First wrapped row shown in the preview
    pub preview_offset: usize,
    /// Preview rows wrapped to the current preview width
    pub preview_rows: Vec<Line<'static>>,
    /// Terminal size
    pub width: u16,
    pub height: u16,
    /// Active modal prompt, if any
    pub prompt: Option<Prompt>,
    /// About overlay visibility
    pub about_visible: bool,
    toast: Option<Toast>,
    /// Set by the first Ctrl+Q on a dirty buffer
    pub quit_confirmed: bool,
    /// Should the application quit?
    pub should_quit: bool,
}

impl Model {
    /// Create a model with an empty, unsaved document.
    pub fn new(config: SessionConfig, size: (u16, u16)) -> Self {
        let mut model = Self {
            session: DocumentSession::new(config),
            preview: Preview::new(),
            split: PaneSplit::default(),
            scroll_sync: ScrollSync::default(),
            editor_offset: 0,
            preview_offset: 0,
            preview_rows: Vec::new(),
            width: size.0,
            height: size.1,
            prompt: None,
            about_visible: false,
            toast: None,
            quit_confirmed: false,
            should_quit: false,
        };
        model.reflow_preview();
        model
    }

    /// Everything above the status row.
    pub fn pane_area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height.saturating_sub(1))
    }

    pub fn layout(&self) -> SplitLayout {
        self.split.layout(self.pane_area())
    }

    /// Rows visible in either pane.
    pub const fn viewport_rows(&self) -> usize {
        self.height.saturating_sub(1) as usize
    }

    pub fn metrics(&self, pane: Pane) -> ScrollMetrics {
        match pane {
            Pane::Editor => ScrollMetrics::new(
                self.editor_offset,
                self.session.buffer().line_count(),
                self.viewport_rows(),
            ),
            Pane::Preview => ScrollMetrics::new(
                self.preview_offset,
                self.preview_rows.len(),
                self.viewport_rows(),
            ),
        }
    }

    const fn set_offset(&mut self, pane: Pane, offset: usize) {
        match pane {
            Pane::Editor => self.editor_offset = offset,
            Pane::Preview => self.preview_offset = offset,
        }
    }

    /// Scroll `pane` to `offset` and let the scroll synchronizer move the
    /// other pane.
    ///
    /// The synchronizer's write to the other pane comes back through here as
    /// a scroll event from that pane, which it recognises as an echo.
    pub fn scroll_pane_to(&mut self, pane: Pane, offset: usize, now: Instant) {
        let metrics = self.metrics(pane);
        let offset = offset.min(metrics.range());
        if offset == metrics.offset {
            return;
        }
        self.set_offset(pane, offset);
        let source = self.metrics(pane);
        let target = self.metrics(pane.other());
        if let Some(target_offset) = self.scroll_sync.on_scroll(pane, source, target, now) {
            self.scroll_pane_to(pane.other(), target_offset, now);
        }
    }

    pub fn scroll_pane_by(&mut self, pane: Pane, delta: isize, now: Instant) {
        let current = self.metrics(pane).offset;
        self.scroll_pane_to(pane, current.saturating_add_signed(delta), now);
    }

    /// Keep the editor cursor on screen.
    pub fn ensure_cursor_visible(&mut self, now: Instant) {
        let cursor_line = self.session.buffer().cursor().line;
        let visible_height = self.viewport_rows();
        let offset = if visible_height == 0 || cursor_line < self.editor_offset {
            cursor_line
        } else if cursor_line >= self.editor_offset + visible_height {
            cursor_line + 1 - visible_height
        } else {
            return;
        };
        self.scroll_pane_to(Pane::Editor, offset, now);
    }

    /// Re-render the buffer into the preview pane.
    pub fn refresh_preview(&mut self) {
        let text = self.session.buffer().text();
        if self.preview.refresh(&text) {
            self.reflow_preview();
        }
    }

    /// Re-wrap the preview for the current pane width.
    pub fn reflow_preview(&mut self) {
        let width = self.layout().preview.width;
        self.preview_rows = crate::ui::wrap_preview(self.preview.current().lines(), width);
        self.clamp_offsets();
    }

    fn clamp_offsets(&mut self) {
        self.editor_offset = self.editor_offset.min(self.metrics(Pane::Editor).range());
        self.preview_offset = self.preview_offset.min(self.metrics(Pane::Preview).range());
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.reflow_preview();
    }

    /// Back to the top of both panes, e.g. after opening a file.
    pub const fn reset_scroll(&mut self) {
        self.editor_offset = 0;
        self.preview_offset = 0;
    }

    /// Seed for the save-as prompt: the current path, or a fresh name.
    pub fn save_as_suggestion(&self) -> String {
        self.session
            .path()
            .map_or_else(|| "untitled.md".to_string(), |p| p.display().to_string())
    }

    /// Seed for the open prompt: the directory of the current file.
    pub fn open_suggestion(&self) -> String {
        self.session
            .path()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(String::new, |dir| {
                format!("{}{}", dir.display(), std::path::MAIN_SEPARATOR)
            })
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(SessionConfig::default(), (80, 24))
    }
}
