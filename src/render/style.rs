//! Colours for the terminal preview.
//!
//! Uses ANSI colours that adapt to the terminal's palette, with darker
//! indexed variants on light backgrounds.

use ratatui::style::{Color, Modifier, Style};

use crate::highlight::is_light_background;

fn pick(light: Color, dark: Color) -> Color {
    if is_light_background() { light } else { dark }
}

pub fn heading(level: u8) -> Style {
    let (fg, extra) = match level {
        1 => (
            pick(Color::Indexed(24), Color::Cyan),
            Modifier::BOLD | Modifier::UNDERLINED,
        ),
        2 => (pick(Color::Indexed(22), Color::Green), Modifier::BOLD),
        3 => (pick(Color::Indexed(58), Color::Yellow), Modifier::BOLD),
        4 => (pick(Color::Indexed(24), Color::Blue), Modifier::BOLD),
        5 => (pick(Color::Indexed(54), Color::Magenta), Modifier::BOLD),
        _ => (pick(Color::Indexed(24), Color::Cyan), Modifier::BOLD),
    };
    Style::default().fg(fg).add_modifier(extra)
}

/// Gutter drawn in front of code block lines.
pub fn code_gutter() -> Style {
    Style::default()
        .fg(pick(Color::Indexed(238), Color::Indexed(245)))
        .add_modifier(Modifier::DIM)
}

pub fn quote() -> Style {
    Style::default()
        .fg(pick(Color::Indexed(24), Color::Blue))
        .add_modifier(Modifier::ITALIC)
}

pub fn rule() -> Style {
    Style::default()
        .fg(pick(Color::Indexed(241), Color::Indexed(240)))
        .add_modifier(Modifier::DIM)
}

pub fn image() -> Style {
    Style::default()
        .fg(pick(Color::Indexed(90), Color::Magenta))
        .add_modifier(Modifier::ITALIC)
}

pub fn list_marker() -> Style {
    Style::default().fg(pick(Color::Indexed(24), Color::Yellow))
}

pub fn link(base: Style) -> Style {
    base.fg(pick(Color::Blue, Color::LightBlue))
        .add_modifier(Modifier::UNDERLINED)
}

pub fn inline_code(base: Style) -> Style {
    base.fg(pick(Color::Indexed(88), Color::Red))
        .add_modifier(Modifier::BOLD)
        .remove_modifier(Modifier::ITALIC | Modifier::CROSSED_OUT)
}

pub fn table_border() -> Style {
    rule()
}
