use std::time::Instant;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;
use ratatui::layout::Rect;
use unicode_width::UnicodeWidthChar;

use crate::app::{App, Message, Model};
use crate::command::command_for_key;
use crate::editor::{Direction, Edit};

use super::event_loop::ResizeDebouncer;

/// Rows moved per mouse wheel notch.
const WHEEL_ROWS: isize = 3;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now: Instant,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Paste(text) if model.prompt.is_none() && editor_visible(model) => {
                Some(Message::Edit(Edit::InsertStr(text.replace("\r\n", "\n"))))
            }
            Event::Resize(w, h) => {
                tracing::trace!(width = w, height = h, "resize queued");
                resize_debouncer.queue(*w, *h, now);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.prompt.is_some() {
            return None;
        }
        if model.about_visible {
            return matches!(mouse.kind, MouseEventKind::Up(MouseButton::Left))
                .then_some(Message::HideAbout);
        }

        let layout = model.layout();
        let in_editor = point_in_rect(mouse.column, mouse.row, layout.editor);
        let in_preview = point_in_rect(mouse.column, mouse.row, layout.preview);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if layout
                    .divider
                    .is_some_and(|d| point_in_rect(mouse.column, mouse.row, d))
                {
                    return Some(Message::DividerDragStart(mouse.column));
                }
                if in_editor {
                    return editor_click(model, layout.editor, mouse.column, mouse.row);
                }
                None
            }
            MouseEventKind::Drag(MouseButton::Left) if model.split.is_dragging() => {
                Some(Message::DividerDrag(mouse.column))
            }
            MouseEventKind::Up(MouseButton::Left) if model.split.is_dragging() => {
                Some(Message::DividerDragEnd)
            }
            MouseEventKind::ScrollUp if in_editor => Some(Message::ScrollEditor(-WHEEL_ROWS)),
            MouseEventKind::ScrollDown if in_editor => Some(Message::ScrollEditor(WHEEL_ROWS)),
            MouseEventKind::ScrollUp if in_preview => Some(Message::ScrollPreview(-WHEEL_ROWS)),
            MouseEventKind::ScrollDown if in_preview => Some(Message::ScrollPreview(WHEEL_ROWS)),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if model.prompt.is_some() {
            return match key.code {
                KeyCode::Esc => Some(Message::PromptCancel),
                KeyCode::Enter => Some(Message::PromptSubmit),
                KeyCode::Backspace => Some(Message::PromptBackspace),
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(Message::PromptInput(c))
                }
                _ => None,
            };
        }

        if model.about_visible && matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            return Some(Message::HideAbout);
        }

        if let Some(command) = command_for_key(&key) {
            return Some(Message::Command(command));
        }

        if !editor_visible(model) {
            return match key.code {
                KeyCode::Up => Some(Message::ScrollPreview(-1)),
                KeyCode::Down => Some(Message::ScrollPreview(1)),
                KeyCode::PageUp => Some(Message::ScrollPreview(-page_rows(model))),
                KeyCode::PageDown => Some(Message::ScrollPreview(page_rows(model))),
                _ => None,
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                Some(Message::Edit(Edit::InsertChar(c)))
            }
            KeyCode::Enter => Some(Message::Edit(Edit::SplitLine)),
            KeyCode::Tab => Some(Message::Edit(Edit::InsertStr("    ".to_string()))),
            KeyCode::Backspace => Some(Message::Edit(Edit::DeleteBack)),
            KeyCode::Delete => Some(Message::Edit(Edit::DeleteForward)),
            KeyCode::Left if ctrl => Some(Message::MoveWordLeft),
            KeyCode::Right if ctrl => Some(Message::MoveWordRight),
            KeyCode::Home if ctrl => Some(Message::MoveToStart),
            KeyCode::End if ctrl => Some(Message::MoveToEnd),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down)),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
            KeyCode::Home => Some(Message::MoveHome),
            KeyCode::End => Some(Message::MoveEnd),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            _ => None,
        }
    }

    pub(super) fn view(model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

fn editor_visible(model: &Model) -> bool {
    model.layout().editor.width > 0
}

fn page_rows(model: &Model) -> isize {
    isize::try_from(model.viewport_rows().max(1)).unwrap_or(isize::MAX)
}

/// Place the cursor under a click in the editor pane.
fn editor_click(model: &Model, area: Rect, column: u16, row: u16) -> Option<Message> {
    let buffer = model.session.buffer();
    let line = model.editor_offset + usize::from(row - area.y);
    if line >= buffer.line_count() {
        return Some(Message::MoveToEnd);
    }
    let gutter = crate::ui::editor_gutter_width(buffer.line_count());
    let text_col = column.saturating_sub(area.x + gutter);
    let text = buffer.line_at(line).unwrap_or_default();
    let scroll = crate::ui::editor_hscroll(model, area);
    let col = byte_col_for_display(&text, usize::from(text_col) + usize::from(scroll));
    Some(Message::MoveTo(line, col))
}

/// Byte offset of the character drawn at display column `target`.
pub(super) fn byte_col_for_display(text: &str, target: usize) -> usize {
    let mut width = 0;
    for (idx, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if width + w > target {
            return idx;
        }
        width += w;
    }
    text.len()
}

const fn point_in_rect(col: u16, row: u16, rect: Rect) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}
