use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::app::Prompt;
use crate::command::Command;

pub fn render_about(frame: &mut Frame, area: Rect) {
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::styled(
        format!("marksplit {}", env!("CARGO_PKG_VERSION")),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::raw(env!("CARGO_PKG_DESCRIPTION")));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Commands", section_style));
    for command in Command::ALL {
        lines.push(Line::raw(format!(
            "  {:<20}{}",
            command.key_hint(),
            command.label()
        )));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled("Panes", section_style));
    lines.push(Line::raw("  Drag the divider to resize; drag to an edge to collapse"));
    lines.push(Line::raw("  Scrolling either pane scrolls the other"));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Esc closes", dim_style));

    let content_height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    // Border(1) + padding(1) on each side.
    let popup = centered_popup_rect(66, content_height.saturating_add(4), area);

    let block = Block::default()
        .title("About")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn render_prompt(prompt: &Prompt, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(10).clamp(24, 72);
    let popup = centered_popup_rect(popup_width, 4, area);
    // Border and one column of padding on each side, one cell for the cursor.
    let visible = usize::from(popup.width.saturating_sub(5));

    let input = Line::from(vec![
        Span::raw(input_tail(&prompt.input, visible).to_string()),
        Span::styled(" ", Style::default().bg(Color::White).fg(Color::Black)),
    ]);
    let hint = Line::styled(
        "Enter confirm \u{2502} Esc cancel",
        Style::default().fg(Color::Indexed(245)),
    );

    let block = Block::default()
        .title(prompt.kind.title())
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(vec![input, hint]).block(block), popup);
}

/// The end of `input` that fits in `width` columns.
fn input_tail(input: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in input.char_indices().rev() {
        used += ch.width().unwrap_or(0);
        if used > width {
            return &input[idx + ch.len_utf8()..];
        }
    }
    input
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_tail_keeps_short_input() {
        assert_eq!(input_tail("notes.md", 20), "notes.md");
    }

    #[test]
    fn test_input_tail_shows_end_of_long_input() {
        assert_eq!(input_tail("/home/user/docs/notes.md", 8), "notes.md");
    }

    #[test]
    fn test_centered_popup_fits_small_area() {
        let rect = centered_popup_rect(80, 10, Rect::new(0, 0, 40, 6));
        assert_eq!(rect, Rect::new(0, 0, 40, 6));
    }
}
