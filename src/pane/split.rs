use ratatui::layout::Rect;

/// Editor share of the width when the app starts.
pub const DEFAULT_SPLIT_PERCENT: f64 = 50.0;
/// Dragging below this collapses the editor.
pub const SNAP_LOW: f64 = 5.0;
/// Dragging above this collapses the preview.
pub const SNAP_HIGH: f64 = 95.0;

/// Where each pane goes for a given area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitLayout {
    pub editor: Rect,
    /// The one-column drag handle, absent in preview-only mode.
    pub divider: Option<Rect>,
    pub preview: Rect,
}

/// The draggable divider between editor and preview.
#[derive(Debug, Clone, PartialEq)]
pub struct PaneSplit {
    percent: f64,
    dragging: bool,
    preview_only: bool,
}

impl Default for PaneSplit {
    fn default() -> Self {
        Self::new(DEFAULT_SPLIT_PERCENT)
    }
}

impl PaneSplit {
    pub fn new(percent: f64) -> Self {
        Self {
            percent: snap(percent),
            dragging: false,
            preview_only: false,
        }
    }

    /// Editor width as a percentage of the container.
    pub const fn percent(&self) -> f64 {
        self.percent
    }

    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub const fn is_preview_only(&self) -> bool {
        self.preview_only
    }

    /// Show only the preview, or go back to the split view.
    ///
    /// The divider position is kept across toggles.
    pub fn toggle_preview_only(&mut self) {
        self.preview_only = !self.preview_only;
        self.dragging = false;
    }

    pub fn set_preview_only(&mut self, preview_only: bool) {
        self.preview_only = preview_only;
        self.dragging = false;
    }

    /// Start a drag if `column` is on the divider.
    pub fn begin_drag(&mut self, column: u16, area: Rect) -> bool {
        let on_divider = self
            .layout(area)
            .divider
            .is_some_and(|divider| column == divider.x);
        self.dragging = on_divider;
        on_divider
    }

    /// Move the divider to pointer column `column` while dragging.
    ///
    /// Returns false (and changes nothing) when no drag is in progress.
    pub fn drag_to(&mut self, column: u16, area: Rect) -> bool {
        if !self.dragging || area.width == 0 {
            return false;
        }
        let relative = f64::from(column.saturating_sub(area.x));
        self.percent = snap(relative * 100.0 / f64::from(area.width));
        tracing::trace!(percent = self.percent, "divider moved");
        true
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Split `area` into editor, divider and preview columns.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn layout(&self, area: Rect) -> SplitLayout {
        if self.preview_only || area.width == 0 {
            return SplitLayout {
                editor: Rect { width: 0, ..area },
                divider: None,
                preview: area,
            };
        }
        let available = area.width - 1;
        let editor_width = ((f64::from(available) * self.percent / 100.0).round() as u16)
            .min(available);
        let preview_width = available - editor_width;
        SplitLayout {
            editor: Rect {
                width: editor_width,
                ..area
            },
            divider: Some(Rect {
                x: area.x + editor_width,
                width: 1,
                ..area
            }),
            preview: Rect {
                x: area.x + editor_width + 1,
                width: preview_width,
                ..area
            },
        }
    }
}

/// Clamp to `[0, 100]` and collapse the near-edge zones.
fn snap(percent: f64) -> f64 {
    if percent.is_nan() || percent < SNAP_LOW {
        0.0
    } else if percent > SNAP_HIGH {
        100.0
    } else {
        percent
    }
}
