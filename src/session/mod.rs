//! The document session: buffer, file identity, dirty flag and timers.
//!
//! A session is either `Unsaved` (no backing file yet) or `Saved` (has a
//! path). Every text change goes through the session so it can mark the
//! buffer dirty and restart two debounced timers:
//!
//! - the **render** timer, always, with a short delay;
//! - the **auto-save** timer, only when a path is known, with a longer delay.
//!
//! Saves are two-phase. [`DocumentSession::begin_save`] snapshots the buffer
//! into a [`SaveTicket`]; whoever performs the write hands the result back to
//! [`DocumentSession::finish_save`]. The ticket remembers the buffer revision
//! it was taken from, so an edit made while the write is in flight keeps the
//! buffer dirty even when that write succeeds.

mod debounce;

pub use debounce::Debouncer;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::editor::{Edit, EditorBuffer};
use crate::gateway::{FileGateway, GatewayError};

/// Delay between the last edit and the preview refresh.
pub const DEFAULT_RENDER_DELAY: Duration = Duration::from_millis(10);
/// Delay between the last edit and the automatic save.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

/// Failures surfaced to the user. Cancellation is never an error.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to open file: {0}")]
    Open(#[source] GatewayError),
    #[error("Failed to save file: {0}")]
    Save(#[source] GatewayError),
    #[error("Rename failed: {0}")]
    Rename(#[source] GatewayError),
    #[error("Rename failed: the document has not been saved yet")]
    NotOnDisk,
}

/// Timer settings for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub render_delay: Duration,
    /// `None` turns auto-save off.
    pub autosave_delay: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            render_delay: DEFAULT_RENDER_DELAY,
            autosave_delay: Some(DEFAULT_AUTOSAVE_DELAY),
        }
    }
}

/// Observable state of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unsaved { dirty: bool },
    Saved { path: PathBuf, dirty: bool },
}

/// Why a write was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Save,
    SaveAs,
    AutoSave,
}

/// A snapshot of the buffer on its way to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    pub path: PathBuf,
    pub content: String,
    /// Buffer revision the content was taken from.
    pub revision: u64,
    /// Document the ticket belongs to; bumps on every open.
    pub epoch: u64,
    pub kind: SaveKind,
}

/// What `save()` needs next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStart {
    /// The buffer has never been saved; ask for a path.
    NeedsPath,
    Write(SaveTicket),
}

/// Result of applying a finished write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { path: PathBuf, clean: bool },
    /// The user dismissed the save-as prompt.
    Canceled,
    /// The write belonged to a document that has since been replaced.
    Stale,
}

/// Result of a rename request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed(PathBuf),
    /// Empty or identical name; nothing to do.
    Unchanged,
}

/// Which timers fired in one poll.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvents {
    pub render: bool,
    pub autosave: bool,
}

#[derive(Debug)]
pub struct DocumentSession {
    buffer: EditorBuffer,
    path: Option<PathBuf>,
    dirty: bool,
    revision: u64,
    epoch: u64,
    render_timer: Debouncer,
    autosave_timer: Option<Debouncer>,
}

impl DocumentSession {
    /// A fresh, empty, unsaved session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            buffer: EditorBuffer::empty(),
            path: None,
            dirty: false,
            revision: 0,
            epoch: 0,
            render_timer: Debouncer::new(config.render_delay),
            autosave_timer: config.autosave_delay.map(Debouncer::new),
        }
    }

    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    /// Mutable buffer access for cursor movement.
    ///
    /// Text changes must go through [`Self::apply_edit`] or [`Self::edit`] so
    /// the dirty flag and timers stay correct.
    pub const fn buffer_mut(&mut self) -> &mut EditorBuffer {
        &mut self.buffer
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self) -> SessionState {
        match &self.path {
            Some(path) => SessionState::Saved {
                path: path.clone(),
                dirty: self.dirty,
            },
            None => SessionState::Unsaved { dirty: self.dirty },
        }
    }

    /// File name for the status bar, `*` marking unsaved changes.
    pub fn display_name(&self) -> String {
        let mut name = self
            .path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| "Untitled".to_string(), |n| n.to_string_lossy().into_owned());
        if self.dirty {
            name.push('*');
        }
        name
    }

    /// Replace the session with a file's content: `Saved(path, clean)`.
    ///
    /// Pending timers are dropped and a render is due immediately.
    pub fn open(&mut self, path: PathBuf, content: &str, now: Instant) {
        tracing::debug!(path = %path.display(), bytes = content.len(), "open document");
        self.buffer = EditorBuffer::from_text(content);
        self.path = Some(path);
        self.dirty = false;
        self.revision += 1;
        self.epoch += 1;
        if let Some(timer) = &mut self.autosave_timer {
            timer.cancel();
        }
        self.render_timer.schedule_at(now);
    }

    /// Read `path` through the gateway and open it.
    ///
    /// # Errors
    /// Returns [`SessionError::Open`] and leaves the session untouched when the
    /// read fails.
    pub fn open_with(
        &mut self,
        gateway: &dyn FileGateway,
        path: PathBuf,
        now: Instant,
    ) -> Result<(), SessionError> {
        let content = gateway.read_file(&path).map_err(SessionError::Open)?;
        self.open(path, &content, now);
        Ok(())
    }

    /// Replace the whole buffer text. Returns `true` if it changed.
    pub fn edit(&mut self, text: &str, now: Instant) -> bool {
        let changed = self.buffer.replace_text(text);
        if changed {
            self.mark_edited(now);
        }
        changed
    }

    /// Apply an edit at the cursor. Returns `true` if the text changed.
    pub fn apply_edit(&mut self, edit: &Edit, now: Instant) -> bool {
        let changed = self.buffer.apply(edit);
        if changed {
            self.mark_edited(now);
        }
        changed
    }

    fn mark_edited(&mut self, now: Instant) {
        self.revision += 1;
        self.dirty = true;
        self.render_timer.schedule(now);
        if self.path.is_some()
            && let Some(timer) = &mut self.autosave_timer
        {
            timer.schedule(now);
        }
    }

    /// Earliest pending timer deadline, for sizing the event-loop poll.
    pub fn next_deadline(&self) -> Option<Instant> {
        let autosave = self.autosave_timer.as_ref().and_then(Debouncer::deadline);
        match (self.render_timer.deadline(), autosave) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Report which timers have expired. Each fires once per quiet period.
    pub fn poll_timers(&mut self, now: Instant) -> TimerEvents {
        let render = self.render_timer.take_ready(now);
        let autosave = self
            .autosave_timer
            .as_mut()
            .is_some_and(|timer| timer.take_ready(now));
        if render || autosave {
            tracing::trace!(render, autosave, "session timers fired");
        }
        TimerEvents { render, autosave }
    }

    /// Start an explicit save.
    pub fn begin_save(&mut self) -> SaveStart {
        match self.path.clone() {
            Some(path) => SaveStart::Write(self.ticket(path, SaveKind::Save)),
            None => SaveStart::NeedsPath,
        }
    }

    /// Start a save-as. `None` means the user canceled the prompt.
    pub fn begin_save_as(&mut self, choice: Option<PathBuf>) -> Option<SaveTicket> {
        choice.map(|path| self.ticket(path, SaveKind::SaveAs))
    }

    /// Start an auto-save, if there is anything to write and somewhere to
    /// write it.
    pub fn begin_autosave(&mut self) -> Option<SaveTicket> {
        let path = self.path.clone()?;
        if !self.dirty {
            return None;
        }
        Some(self.ticket(path, SaveKind::AutoSave))
    }

    fn ticket(&mut self, path: PathBuf, kind: SaveKind) -> SaveTicket {
        if let Some(timer) = &mut self.autosave_timer {
            timer.cancel();
        }
        SaveTicket {
            path,
            content: self.buffer.text(),
            revision: self.revision,
            epoch: self.epoch,
            kind,
        }
    }

    /// Apply the outcome of a write started by one of the `begin_*` calls.
    ///
    /// On success the path is adopted (save-as) and the dirty flag is cleared
    /// unless the buffer was edited after the ticket was taken, or the
    /// document moved to another path while the write was pending.
    ///
    /// # Errors
    /// Returns [`SessionError::Save`] when the write failed; the session is
    /// left exactly as it was.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), GatewayError>,
    ) -> Result<SaveOutcome, SessionError> {
        if ticket.epoch != self.epoch {
            tracing::debug!(path = %ticket.path.display(), "dropping result for replaced document");
            return Ok(SaveOutcome::Stale);
        }
        result.map_err(SessionError::Save)?;

        if ticket.kind == SaveKind::SaveAs || self.path.is_none() {
            self.path = Some(ticket.path.clone());
        }
        let clean = ticket.revision == self.revision
            && self.path.as_deref() == Some(ticket.path.as_path());
        if clean {
            self.dirty = false;
        }
        tracing::debug!(
            path = %ticket.path.display(),
            revision = ticket.revision,
            clean,
            "saved"
        );
        Ok(SaveOutcome::Saved {
            path: ticket.path,
            clean,
        })
    }

    /// Save synchronously through `gateway`.
    ///
    /// # Errors
    /// Returns [`SessionError::Save`] when the write fails.
    pub fn save_with(&mut self, gateway: &dyn FileGateway) -> Result<Option<SaveOutcome>, SessionError> {
        match self.begin_save() {
            SaveStart::NeedsPath => Ok(None),
            SaveStart::Write(ticket) => {
                let result = gateway.write_file(&ticket.path, &ticket.content);
                self.finish_save(ticket, result).map(Some)
            }
        }
    }

    /// Save-as synchronously through `gateway`.
    ///
    /// # Errors
    /// Returns [`SessionError::Save`] when the write fails.
    pub fn save_as_with(
        &mut self,
        gateway: &dyn FileGateway,
        choice: Option<PathBuf>,
    ) -> Result<SaveOutcome, SessionError> {
        let Some(ticket) = self.begin_save_as(choice) else {
            return Ok(SaveOutcome::Canceled);
        };
        let result = gateway.write_file(&ticket.path, &ticket.content);
        self.finish_save(ticket, result)
    }

    /// Rename the backing file. Only valid once the document is on disk.
    ///
    /// # Errors
    /// Returns [`SessionError::NotOnDisk`] for an unsaved buffer and
    /// [`SessionError::Rename`] when the gateway fails; the path is unchanged
    /// in both cases.
    pub fn rename(
        &mut self,
        gateway: &dyn FileGateway,
        new_name: &str,
    ) -> Result<RenameOutcome, SessionError> {
        let Some(old_path) = self.path.as_deref() else {
            return Err(SessionError::NotOnDisk);
        };
        let new_name = new_name.trim();
        let current = old_path.file_name().map(|n| n.to_string_lossy());
        if new_name.is_empty() || current.as_deref() == Some(new_name) {
            return Ok(RenameOutcome::Unchanged);
        }
        let new_path = gateway
            .rename_file(old_path, new_name)
            .map_err(SessionError::Rename)?;
        self.path = Some(new_path.clone());
        Ok(RenameOutcome::Renamed(new_path))
    }
}
