use std::io::{Write, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};
use crate::gateway::SaveWorker;

/// Longest the loop sleeps when nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);
/// Poll interval while a write is in flight or a resize is settling.
const BUSY_POLL: Duration = Duration::from_millis(10);

pub(super) struct ResizeDebouncer {
    delay: Duration,
    pending: Option<(u16, u16, Instant)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now: Instant) {
        self.pending = Some((width, height, now));
    }

    pub(super) fn take_ready(&mut self, now: Instant) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now.saturating_duration_since(queued_at) >= self.delay {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the start-up file cannot be read, the terminal
    /// cannot be initialised, or the event loop hits an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let mut model = Model::new(self.session_config, (80, 24));
        model.split = crate::pane::PaneSplit::new(self.split_percent);
        model.split.set_preview_only(self.preview_only);

        // Open before touching the terminal so a bad path is a plain error.
        if let Some(path) = self.file.clone() {
            if path.exists() {
                model
                    .session
                    .open_with(self.gateway.as_ref(), path.clone(), Instant::now())
                    .with_context(|| format!("Failed to open {}", path.display()))?;
            } else {
                tracing::debug!(path = %path.display(), "new file, created on first save");
                model.session.open(path, "", Instant::now());
            }
        }

        let mut worker =
            SaveWorker::spawn(Arc::clone(&self.gateway)).context("Failed to start save worker")?;

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal, marksplit requires an interactive terminal")?;
        let size = terminal.size()?;
        model.resize(size.width, size.height);

        let result = self.event_loop(&mut terminal, &mut model, &mut worker);

        let _ = execute!(stdout(), DisableBracketedPaste, DisableMouseCapture);
        ratatui::restore();

        // Queued writes finish before the worker goes away.
        drop(worker);
        result
    }

    pub(super) fn dispatch(&self, model: &mut Model, worker: &mut SaveWorker, msg: Message) {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        self.handle_message_side_effects(model, worker, &side_msg);
    }

    fn event_loop(
        &self,
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        worker: &mut SaveWorker,
    ) -> Result<()> {
        let mut resize_debouncer = ResizeDebouncer::new(Duration::from_millis(50));
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;
        set_mouse_motion_tracking(true)?;

        loop {
            let now = Instant::now();
            if model.expire_toast(now) {
                needs_render = true;
            }

            if Self::drain_save_completions(model, worker) {
                needs_render = true;
            }

            let timers = model.session.poll_timers(now);
            if timers.render {
                self.dispatch(model, worker, Message::RenderDue);
                needs_render = true;
            }
            if timers.autosave {
                self.dispatch(model, worker, Message::AutoSaveDue);
            }

            if let Some((width, height)) = resize_debouncer.take_ready(now) {
                tracing::trace!(frame = frame_idx, width, height, "resize applied");
                self.dispatch(model, worker, Message::Resize(width, height));
                needs_render = true;
            }

            let timeout = if needs_render {
                Duration::ZERO
            } else {
                let mut timeout = IDLE_POLL;
                if let Some(deadline) = model.session.next_deadline() {
                    timeout = timeout.min(deadline.saturating_duration_since(Instant::now()));
                }
                if resize_debouncer.is_pending() || worker.in_flight() > 0 {
                    timeout = timeout.min(BUSY_POLL);
                }
                timeout
            };

            if event::poll(timeout)? {
                let msg = Self::handle_event(
                    &event::read()?,
                    model,
                    Instant::now(),
                    &mut resize_debouncer,
                );
                if let Some(msg) = msg {
                    self.dispatch(model, worker, msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts and pastes into a single render.
                let mut drained = 0_u32;
                while event::poll(Duration::ZERO)? {
                    let msg = Self::handle_event(
                        &event::read()?,
                        model,
                        Instant::now(),
                        &mut resize_debouncer,
                    );
                    if let Some(msg) = msg {
                        drained += 1;
                        self.dispatch(model, worker, msg);
                        needs_render = true;
                    }
                }
                if drained > 0 {
                    tracing::trace!(frame = frame_idx, drained, "coalesced events");
                }
            }

            if needs_render {
                frame_idx += 1;
                terminal.draw(|frame| Self::view(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        let _ = set_mouse_motion_tracking(false);
        Ok(())
    }
}

fn set_mouse_motion_tracking(enable: bool) -> std::io::Result<()> {
    // Any-event mouse reporting (1003) with SGR encoding (1006), so drags on
    // the divider are reported in every terminal.
    let mut out = stdout();
    if enable {
        out.write_all(b"\x1b[?1003h\x1b[?1006h")?;
    } else {
        out.write_all(b"\x1b[?1003l\x1b[?1006l")?;
    }
    out.flush()
}
