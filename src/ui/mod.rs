//! Terminal UI components.
//!
//! This module contains all drawing code:
//! - [`render`]: editor, divider, preview, status row and overlays
//! - [`wrap_preview`]: lays the rendered preview out at the pane width

mod overlays;
mod render;
mod status;
mod wrap;

pub use render::{editor_gutter_width, editor_hscroll, line_number_width, render};
pub use wrap::{wrap_line, wrap_preview};
