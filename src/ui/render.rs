use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::Model;

use super::{overlays, status};

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let pane_area = Rect {
        height: area.height.saturating_sub(1),
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: area.height.min(1),
        ..area
    };
    let layout = model.split.layout(pane_area);

    if layout.editor.width > 0 {
        render_editor(model, frame, layout.editor);
    }
    if let Some(divider) = layout.divider {
        render_divider(model, frame, divider);
    }
    if layout.preview.width > 0 {
        render_preview(model, frame, layout.preview);
    }

    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, status_area);
    } else {
        status::render_status_bar(model, frame, status_area);
    }

    if let Some(prompt) = &model.prompt {
        overlays::render_prompt(prompt, frame, area);
    } else if model.about_visible {
        overlays::render_about(frame, area);
    }
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let buf = model.session.buffer();
    let total_lines = buf.line_count();
    let gutter = editor_gutter_width(total_lines).min(area.width);
    let gutter_area = Rect {
        width: gutter,
        ..area
    };
    let text_area = Rect {
        x: area.x + gutter,
        width: area.width - gutter,
        ..area
    };

    let number_width = usize::from(line_number_width(total_lines));
    let start = model.editor_offset;
    let end = (start + usize::from(area.height)).min(total_lines);
    let cursor = buf.cursor();

    let mut numbers: Vec<Line> = Vec::new();
    let mut content: Vec<Line> = Vec::new();
    for line_idx in start..end {
        let line_text = buf.line_at(line_idx).unwrap_or_default();
        let number_style = if line_idx == cursor.line {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        numbers.push(Line::styled(
            format!("{:>number_width$} ", line_idx + 1),
            number_style,
        ));
        if line_idx == cursor.line {
            content.push(cursor_line(&line_text, cursor.col));
        } else {
            content.push(Line::raw(line_text));
        }
    }

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(numbers), gutter_area);
    frame.render_widget(
        Paragraph::new(content).scroll((0, editor_hscroll(model, area))),
        text_area,
    );
}

/// Split a line at the cursor so the character under it can be drawn
/// inverted.
fn cursor_line(line_text: &str, col: usize) -> Line<'static> {
    let col = col.min(line_text.len());
    let (before, rest) = line_text.split_at(col);
    let mut chars = rest.chars();
    let cursor_char = chars.next().map_or_else(|| " ".to_string(), String::from);
    let after = chars.as_str();

    let mut spans = Vec::with_capacity(3);
    if !before.is_empty() {
        spans.push(Span::raw(before.to_string()));
    }
    spans.push(Span::styled(
        cursor_char,
        Style::default().bg(Color::White).fg(Color::Black),
    ));
    if !after.is_empty() {
        spans.push(Span::raw(after.to_string()));
    }
    Line::from(spans)
}

fn render_divider(model: &Model, frame: &mut Frame, area: Rect) {
    let style = if model.split.is_dragging() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let bar: Vec<Line> = (0..area.height)
        .map(|_| Line::styled("\u{2502}", style))
        .collect();
    frame.render_widget(Paragraph::new(bar), area);
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let rows = &model.preview_rows;
    let start = model.preview_offset.min(rows.len());
    let end = (start + usize::from(area.height)).min(rows.len());
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(rows[start..end].to_vec()), area);
}

/// Columns taken by the line numbers and the space after them.
pub const fn editor_gutter_width(total_lines: usize) -> u16 {
    line_number_width(total_lines) + 1
}

/// Horizontal scroll that keeps the cursor inside the editor's text area.
pub fn editor_hscroll(model: &Model, area: Rect) -> u16 {
    let buf = model.session.buffer();
    let text_width = usize::from(area.width.saturating_sub(editor_gutter_width(buf.line_count())));
    if text_width == 0 {
        return 0;
    }
    let cursor = buf.cursor();
    let line = buf.line_at(cursor.line).unwrap_or_default();
    let cursor_col = line.get(..cursor.col).map_or(0, UnicodeWidthStr::width);
    u16::try_from((cursor_col + 1).saturating_sub(text_width)).unwrap_or(u16::MAX)
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}
