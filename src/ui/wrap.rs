use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::render::{LineKind, PreviewLine};

/// Lay out logical preview lines as rows of at most `width` columns.
///
/// A zero width yields no rows: the pane is collapsed.
pub fn wrap_preview(lines: &[PreviewLine], width: u16) -> Vec<Line<'static>> {
    if width == 0 {
        return Vec::new();
    }
    let width = usize::from(width);
    let mut rows = Vec::with_capacity(lines.len());
    for line in lines {
        rows.extend(wrap_line(line, width));
    }
    rows
}

/// Wrap one logical line. Always yields at least one row.
pub fn wrap_line(line: &PreviewLine, width: usize) -> Vec<Line<'static>> {
    let mut rows = Rows::new(line, width.max(1));
    match line.kind {
        LineKind::Rule => rows.fill_rule(),
        LineKind::Code => {
            for span in &line.spans {
                rows.push_cut(span);
            }
        }
        LineKind::Text => {
            for token in line.spans.iter().flat_map(split_tokens) {
                rows.push_word(&token);
            }
        }
    }
    rows.finish()
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|span| span.content.width()).sum()
}

/// Row builder for a single logical line.
struct Rows<'a> {
    line: &'a PreviewLine,
    width: usize,
    rows: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    used: usize,
    /// No content on the current row yet, only decoration.
    fresh: bool,
}

impl<'a> Rows<'a> {
    fn new(line: &'a PreviewLine, width: usize) -> Self {
        Self {
            line,
            width,
            rows: Vec::new(),
            current: line.prefix.clone(),
            used: spans_width(&line.prefix),
            fresh: true,
        }
    }

    fn break_row(&mut self) {
        let row = std::mem::replace(&mut self.current, self.line.continuation.clone());
        self.rows.push(Line::from(row));
        self.used = spans_width(&self.line.continuation);
        self.fresh = true;
    }

    fn push(&mut self, span: Span<'static>) {
        if span.content.is_empty() {
            return;
        }
        self.used += span.content.width();
        self.current.push(span);
        self.fresh = false;
    }

    /// Append `span`, cutting it at the row edge as often as needed.
    fn push_cut(&mut self, span: &Span<'static>) {
        let mut chunk = String::new();
        let mut chunk_width = 0;
        for ch in span.content.chars() {
            let w = ch.width().unwrap_or(0);
            if self.used + chunk_width + w > self.width && !(self.fresh && chunk.is_empty()) {
                self.push(Span::styled(std::mem::take(&mut chunk), span.style));
                chunk_width = 0;
                self.break_row();
            }
            chunk.push(ch);
            chunk_width += w;
        }
        self.push(Span::styled(chunk, span.style));
    }

    /// Append a word or whitespace run, moving to a new row when it does not
    /// fit. Whitespace at the start of a continuation row is dropped.
    fn push_word(&mut self, token: &Span<'static>) {
        let token_width = token.content.width();
        let is_ws = token.content.chars().all(char::is_whitespace);
        if self.used + token_width > self.width && !self.fresh {
            self.break_row();
        }
        if is_ws && self.fresh && !self.rows.is_empty() {
            return;
        }
        if self.used + token_width > self.width {
            self.push_cut(token);
        } else {
            self.push(token.clone());
        }
    }

    fn fill_rule(&mut self) {
        let fill = self.width.saturating_sub(self.used).max(1);
        let (glyph, style) = self
            .line
            .spans
            .first()
            .map_or(("─".into(), Default::default()), |span| {
                (span.content.to_string(), span.style)
            });
        let count = fill / glyph.width().max(1);
        self.push(Span::styled(glyph.repeat(count.max(1)), style));
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.rows.push(Line::from(self.current));
        self.rows
    }
}

/// Split a span into alternating word and whitespace runs, keeping its style.
fn split_tokens(span: &Span<'static>) -> Vec<Span<'static>> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut ws_state: Option<bool> = None;

    for ch in span.content.chars() {
        let is_ws = ch.is_whitespace();
        match ws_state {
            Some(state) if state == is_ws => buf.push(ch),
            Some(_) => {
                out.push(Span::styled(std::mem::take(&mut buf), span.style));
                buf.push(ch);
                ws_state = Some(is_ws);
            }
            None => {
                buf.push(ch);
                ws_state = Some(is_ws);
            }
        }
    }

    if !buf.is_empty() {
        out.push(Span::styled(buf, span.style));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::{Color, Style};

    fn row_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn texts(rows: &[Line<'_>]) -> Vec<String> {
        rows.iter().map(row_text).collect()
    }

    #[test]
    fn test_short_text_is_one_row() {
        let line = PreviewLine::text(vec![Span::raw("hello world")]);
        assert_eq!(texts(&wrap_line(&line, 20)), vec!["hello world"]);
    }

    #[test]
    fn test_text_wraps_at_word_boundary() {
        let line = PreviewLine::text(vec![Span::raw("alpha beta gamma")]);
        assert_eq!(texts(&wrap_line(&line, 11)), vec!["alpha beta ", "gamma"]);
    }

    #[test]
    fn test_long_word_is_cut() {
        let line = PreviewLine::text(vec![Span::raw("abcdefghij")]);
        assert_eq!(texts(&wrap_line(&line, 4)), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_continuation_prefix_on_wrapped_rows() {
        let line = PreviewLine {
            prefix: vec![Span::raw("• ")],
            continuation: vec![Span::raw("  ")],
            spans: vec![Span::raw("one two three")],
            kind: LineKind::Text,
        };
        assert_eq!(
            texts(&wrap_line(&line, 9)),
            vec!["• one two", "  three"]
        );
    }

    #[test]
    fn test_styles_survive_wrapping() {
        let bold = Style::default().fg(Color::Red);
        let line = PreviewLine::text(vec![Span::raw("plain "), Span::styled("red words", bold)]);
        let rows = wrap_line(&line, 10);
        assert_eq!(texts(&rows), vec!["plain red ", "words"]);
        assert_eq!(rows[1].spans[0].style, bold);
    }

    #[test]
    fn test_code_is_cut_at_exact_column() {
        let line = PreviewLine {
            prefix: vec![Span::raw("│ ")],
            continuation: vec![Span::raw("│ ")],
            spans: vec![Span::raw("let x = 1;")],
            kind: LineKind::Code,
        };
        assert_eq!(
            texts(&wrap_line(&line, 6)),
            vec!["│ let ", "│ x = ", "│ 1;"]
        );
    }

    #[test]
    fn test_rule_fills_width() {
        let line = PreviewLine {
            prefix: Vec::new(),
            continuation: Vec::new(),
            spans: vec![Span::raw("─")],
            kind: LineKind::Rule,
        };
        let rows = wrap_line(&line, 12);
        assert_eq!(rows.len(), 1);
        assert_eq!(row_text(&rows[0]), "─".repeat(12));
    }

    #[test]
    fn test_wide_decoration_does_not_loop() {
        let line = PreviewLine {
            prefix: vec![Span::raw("│ │ │ ")],
            continuation: vec![Span::raw("│ │ │ ")],
            spans: vec![Span::raw("text")],
            kind: LineKind::Code,
        };
        let rows = wrap_line(&line, 3);
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|row| row_text(row).starts_with("│ │ │ ")));
    }

    #[test]
    fn test_blank_line_keeps_a_row() {
        assert_eq!(wrap_line(&PreviewLine::blank(), 10).len(), 1);
    }

    #[test]
    fn test_zero_width_has_no_rows() {
        let lines = vec![PreviewLine::text(vec![Span::raw("x")])];
        assert!(wrap_preview(&lines, 0).is_empty());
    }

    #[test]
    fn test_wide_chars_count_double() {
        let line = PreviewLine::text(vec![Span::raw("日本語")]);
        assert_eq!(texts(&wrap_line(&line, 4)), vec!["日本", "語"]);
    }
}
