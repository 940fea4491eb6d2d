use std::path::PathBuf;
use std::time::Instant;

use crate::app::model::{Prompt, PromptKind};
use crate::app::{App, Message, Model, ToastLevel};
use crate::command::Command;
use crate::gateway::SaveWorker;
use crate::session::{RenameOutcome, SaveKind, SaveOutcome, SaveStart};

impl App {
    pub(super) fn handle_message_side_effects(
        &self,
        model: &mut Model,
        worker: &mut SaveWorker,
        msg: &Message,
    ) {
        match msg {
            Message::Command(Command::Save) => match model.session.begin_save() {
                SaveStart::NeedsPath => {
                    model.prompt = Some(Prompt::new(
                        PromptKind::SaveAs,
                        model.save_as_suggestion(),
                    ));
                }
                SaveStart::Write(ticket) => worker.submit(ticket),
            },
            Message::AutoSaveDue => {
                if let Some(ticket) = model.session.begin_autosave() {
                    worker.submit(ticket);
                }
            }
            Message::PromptSubmit => {
                if let Some(prompt) = model.prompt.take() {
                    self.submit_prompt(model, worker, prompt.kind, prompt.input.trim());
                }
            }
            _ => {}
        }
    }

    fn submit_prompt(
        &self,
        model: &mut Model,
        worker: &mut SaveWorker,
        kind: PromptKind,
        input: &str,
    ) {
        match kind {
            PromptKind::Open => {
                if input.is_empty() {
                    return;
                }
                self.open_file(model, PathBuf::from(input));
            }
            PromptKind::SaveAs => {
                let choice = (!input.is_empty()).then(|| PathBuf::from(input));
                if let Some(ticket) = model.session.begin_save_as(choice) {
                    worker.submit(ticket);
                }
            }
            PromptKind::Rename if worker.in_flight() > 0 => {
                model.show_toast(
                    ToastLevel::Warning,
                    "Wait for the save to finish before renaming",
                );
            }
            PromptKind::Rename => match model.session.rename(self.gateway.as_ref(), input) {
                Ok(RenameOutcome::Renamed(path)) => {
                    let name = path
                        .file_name()
                        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
                    model.show_toast(ToastLevel::Info, format!("Renamed to {name}"));
                }
                Ok(RenameOutcome::Unchanged) => {}
                Err(err) => {
                    tracing::error!("{err}");
                    model.show_toast(ToastLevel::Error, err.to_string());
                }
            },
        }
    }

    /// Replace the document with the file at `path`.
    pub(super) fn open_file(&self, model: &mut Model, path: PathBuf) {
        match model
            .session
            .open_with(self.gateway.as_ref(), path, Instant::now())
        {
            Ok(()) => {
                model.reset_scroll();
                model.refresh_preview();
            }
            Err(err) => {
                tracing::error!("{err}");
                model.show_toast(ToastLevel::Error, err.to_string());
            }
        }
    }

    /// Apply finished writes from the save worker. Returns true if any
    /// arrived.
    pub(super) fn drain_save_completions(model: &mut Model, worker: &mut SaveWorker) -> bool {
        let mut any = false;
        while let Some(completion) = worker.try_recv() {
            any = true;
            let kind = completion.ticket.kind;
            match model.session.finish_save(completion.ticket, completion.result) {
                Ok(SaveOutcome::Saved { path, clean }) => {
                    if kind != SaveKind::AutoSave {
                        let name = path
                            .file_name()
                            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
                        let note = if clean { "" } else { " (edited since)" };
                        model.show_toast(ToastLevel::Info, format!("Saved {name}{note}"));
                    }
                }
                Ok(SaveOutcome::Canceled | SaveOutcome::Stale) => {}
                Err(err) => {
                    tracing::error!("{err}");
                    model.show_toast(ToastLevel::Error, err.to_string());
                }
            }
        }
        any
    }
}
