use std::time::{Duration, Instant};

use super::Pane;

/// How long scroll events from a pane we just moved are ignored.
pub const DEFAULT_SUPPRESS_WINDOW: Duration = Duration::from_millis(50);

/// The scroll geometry of one pane, in terminal rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    pub offset: usize,
    pub content_rows: usize,
    pub viewport_rows: usize,
}

impl ScrollMetrics {
    pub const fn new(offset: usize, content_rows: usize, viewport_rows: usize) -> Self {
        Self {
            offset,
            content_rows,
            viewport_rows,
        }
    }

    /// Largest offset that still fills the viewport.
    pub const fn range(&self) -> usize {
        self.content_rows.saturating_sub(self.viewport_rows)
    }

    /// Position as a fraction of the scrollable range, in `[0, 1]`.
    ///
    /// Content that fits in the viewport has ratio 0.
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        let range = self.range();
        if range == 0 {
            return 0.0;
        }
        (self.offset as f64 / range as f64).clamp(0.0, 1.0)
    }

    /// The offset that puts this pane at `ratio` of its range.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn offset_for_ratio(&self, ratio: f64) -> usize {
        let range = self.range();
        let target = (ratio.clamp(0.0, 1.0) * range as f64).round() as usize;
        target.min(range)
    }
}

/// Mirrors scroll position between the panes without feedback loops.
///
/// Moving a pane programmatically produces a scroll event from that pane;
/// events from the pane we last wrote to are ignored for
/// [`DEFAULT_SUPPRESS_WINDOW`] after the write.
#[derive(Debug, Clone)]
pub struct ScrollSync {
    window: Duration,
    last_write: Option<(Pane, Instant)>,
}

impl Default for ScrollSync {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESS_WINDOW)
    }
}

impl ScrollSync {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_write: None,
        }
    }

    /// Whether scroll events from `pane` are currently echoes of our own
    /// writes.
    pub fn is_suppressed(&self, pane: Pane, now: Instant) -> bool {
        self.last_write.is_some_and(|(written, at)| {
            written == pane && now.saturating_duration_since(at) < self.window
        })
    }

    /// React to `source` scrolling to `source_metrics`.
    ///
    /// Returns the offset the other pane should move to, or `None` when the
    /// event is an echo and must be ignored.
    pub fn on_scroll(
        &mut self,
        source: Pane,
        source_metrics: ScrollMetrics,
        target_metrics: ScrollMetrics,
        now: Instant,
    ) -> Option<usize> {
        if self.is_suppressed(source, now) {
            tracing::trace!(?source, "scroll echo suppressed");
            return None;
        }
        let offset = target_metrics.offset_for_ratio(source_metrics.ratio());
        self.last_write = Some((source.other(), now));
        Some(offset)
    }
}
