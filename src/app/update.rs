use std::time::Instant;

use crate::app::Model;
use crate::app::model::{Prompt, PromptKind, ToastLevel};
use crate::command::Command;
use crate::editor::{Direction, Edit};
use crate::pane::Pane;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editor
    /// Change the text at the cursor
    Edit(Edit),
    /// Move cursor in a direction
    MoveCursor(Direction),
    /// Move cursor to line start (Home)
    MoveHome,
    /// Move cursor to line end (End)
    MoveEnd,
    /// Move cursor one word left (Ctrl+Left)
    MoveWordLeft,
    /// Move cursor one word right (Ctrl+Right)
    MoveWordRight,
    /// Move cursor to buffer start (Ctrl+Home)
    MoveToStart,
    /// Move cursor to buffer end (Ctrl+End)
    MoveToEnd,
    /// Move cursor to a line and byte column (mouse click)
    MoveTo(usize, usize),
    /// Move cursor up one screen
    PageUp,
    /// Move cursor down one screen
    PageDown,

    // Panes
    /// Scroll the editor by n rows (negative is up)
    ScrollEditor(isize),
    /// Scroll the preview by n rows (negative is up)
    ScrollPreview(isize),
    /// Mouse down at a column, possibly on the divider
    DividerDragStart(u16),
    /// Mouse dragged to a column
    DividerDrag(u16),
    /// Mouse released
    DividerDragEnd,

    // Commands
    Command(Command),

    // Prompt
    /// Type a character into the prompt
    PromptInput(char),
    /// Delete the last prompt character
    PromptBackspace,
    /// Confirm the prompt (handled as a side effect)
    PromptSubmit,
    /// Dismiss the prompt
    PromptCancel,
    /// Hide the about overlay
    HideAbout,

    // Timers
    /// The render timer fired
    RenderDue,
    /// The auto-save timer fired (handled as a side effect)
    AutoSaveDue,

    // Window
    /// Terminal resized
    Resize(u16, u16),
}

/// Update the model based on a message.
///
/// This is a pure function apart from reading the clock; I/O happens in
/// the side-effect handler after it.
pub fn update(model: Model, msg: Message) -> Model {
    update_at(model, msg, Instant::now())
}

/// [`update`] with an explicit clock, for timers and scroll sync.
pub fn update_at(mut model: Model, msg: Message, now: Instant) -> Model {
    // Ctrl+S keeps a pending quit armed so the second Ctrl+Q still works.
    if !matches!(
        msg,
        Message::Command(Command::Quit | Command::Save)
            | Message::RenderDue
            | Message::AutoSaveDue
    ) {
        model.quit_confirmed = false;
    }

    match msg {
        // Editor
        Message::Edit(edit) => {
            model.session.apply_edit(&edit, now);
            model.ensure_cursor_visible(now);
        }
        Message::MoveCursor(dir) => {
            model.session.buffer_mut().move_cursor(dir);
            model.ensure_cursor_visible(now);
        }
        Message::MoveHome => {
            model.session.buffer_mut().move_home();
        }
        Message::MoveEnd => {
            model.session.buffer_mut().move_end();
        }
        Message::MoveWordLeft => {
            model.session.buffer_mut().move_word_left();
            model.ensure_cursor_visible(now);
        }
        Message::MoveWordRight => {
            model.session.buffer_mut().move_word_right();
            model.ensure_cursor_visible(now);
        }
        Message::MoveToStart => {
            model.session.buffer_mut().move_to_start();
            model.ensure_cursor_visible(now);
        }
        Message::MoveToEnd => {
            model.session.buffer_mut().move_to_end();
            model.ensure_cursor_visible(now);
        }
        Message::MoveTo(line, col) => {
            model.session.buffer_mut().move_to(line, col);
            model.ensure_cursor_visible(now);
        }
        Message::PageUp => page(&mut model, -1, now),
        Message::PageDown => page(&mut model, 1, now),

        // Panes
        Message::ScrollEditor(delta) => model.scroll_pane_by(Pane::Editor, delta, now),
        Message::ScrollPreview(delta) => model.scroll_pane_by(Pane::Preview, delta, now),
        Message::DividerDragStart(column) => {
            let area = model.pane_area();
            model.split.begin_drag(column, area);
        }
        Message::DividerDrag(column) => {
            let area = model.pane_area();
            if model.split.drag_to(column, area) {
                model.reflow_preview();
            }
        }
        Message::DividerDragEnd => model.split.end_drag(),

        // Commands
        Message::Command(command) => apply_command(&mut model, command),

        // Prompt
        Message::PromptInput(ch) => {
            if let Some(prompt) = &mut model.prompt {
                prompt.input.push(ch);
            }
        }
        Message::PromptBackspace => {
            if let Some(prompt) = &mut model.prompt {
                prompt.input.pop();
            }
        }
        Message::PromptCancel => model.prompt = None,
        Message::HideAbout => model.about_visible = false,
        Message::PromptSubmit | Message::AutoSaveDue => {}

        // Timers
        Message::RenderDue => model.refresh_preview(),

        // Window
        Message::Resize(width, height) => {
            model.resize(width, height);
            model.ensure_cursor_visible(now);
        }
    }
    model
}

/// Move the cursor one screen up (`-1`) or down (`1`).
fn page(model: &mut Model, direction: isize, now: Instant) {
    let rows = isize::try_from(model.viewport_rows().max(1)).unwrap_or(isize::MAX);
    model.session.buffer_mut().move_lines(direction * rows);
    model.ensure_cursor_visible(now);
}

fn apply_command(model: &mut Model, command: Command) {
    match command {
        Command::Open => {
            model.prompt = Some(Prompt::new(PromptKind::Open, model.open_suggestion()));
        }
        Command::SaveAs => {
            model.prompt = Some(Prompt::new(PromptKind::SaveAs, model.save_as_suggestion()));
        }
        Command::Rename => match model.session.path().and_then(|p| p.file_name()) {
            Some(name) => {
                let name = name.to_string_lossy().into_owned();
                model.prompt = Some(Prompt::new(PromptKind::Rename, name));
            }
            None => model.show_toast(ToastLevel::Info, "Save the document before renaming it"),
        },
        Command::TogglePreview => {
            model.split.toggle_preview_only();
            model.reflow_preview();
        }
        Command::About => model.about_visible = !model.about_visible,
        Command::Quit => {
            if model.session.is_dirty() && !model.quit_confirmed {
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes! Press Ctrl+Q again to quit, or Ctrl+S to save",
                );
                model.quit_confirmed = true;
            } else {
                model.should_quit = true;
            }
        }
        // Needs the file gateway; see the side-effect handler.
        Command::Save => {}
    }
}
