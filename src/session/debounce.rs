use std::time::{Duration, Instant};

/// A single pending deadline that restarts on every trigger.
///
/// Rescheduling replaces the previous deadline, so a burst of triggers
/// closer together than `delay` fires exactly once, `delay` after the
/// last one.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Instant>,
}

impl Debouncer {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Restart the delay from `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.pending = Some(now + self.delay);
    }

    /// Fire at `deadline` regardless of the configured delay.
    pub const fn schedule_at(&mut self, deadline: Instant) {
        self.pending = Some(deadline);
    }

    pub const fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn deadline(&self) -> Option<Instant> {
        self.pending
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns true (once) when the deadline has passed.
    pub fn take_ready(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if now >= deadline => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}
