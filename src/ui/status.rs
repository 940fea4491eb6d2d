use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let buffer = model.session.buffer();
    let cursor = buffer.cursor();
    let col = buffer
        .line_at(cursor.line)
        .and_then(|line| line.get(..cursor.col).map(|s| s.chars().count()))
        .unwrap_or(0);
    let mode = if model.split.is_preview_only() {
        "  [preview]"
    } else {
        ""
    };

    let status = format!(
        " {}  Ln {}, Col {}{}  Ctrl+S:save  Ctrl+P:preview  F1:about",
        model.session.display_name(),
        cursor.line + 1,
        col + 1,
        mode
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
