//! Layout state shared by the two panes.
//!
//! [`PaneSplit`] owns the divider position and [`ScrollSync`] keeps the
//! editor and preview scrolled to the same relative position.

mod scroll;
mod split;

pub use scroll::{DEFAULT_SUPPRESS_WINDOW, ScrollMetrics, ScrollSync};
pub use split::{DEFAULT_SPLIT_PERCENT, PaneSplit, SNAP_HIGH, SNAP_LOW, SplitLayout};

/// One of the two panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Editor,
    Preview,
}

impl Pane {
    pub const fn other(self) -> Self {
        match self {
            Self::Editor => Self::Preview,
            Self::Preview => Self::Editor,
        }
    }
}
