//! Terminal rendition of the markdown AST.
//!
//! Produces width-independent logical lines; wrapping to the pane happens at
//! draw time.

use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue, TableAlignment};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use unicode_width::UnicodeWidthStr;

use super::{LineKind, PreviewLine, style};
use crate::highlight;

type Row = (Vec<Span<'static>>, LineKind);

pub(super) fn preview_lines<'a>(root: &'a AstNode<'a>) -> Vec<PreviewLine> {
    let mut out = Vec::new();
    blocks(root, &Indent::default(), false, &mut out);
    out
}

/// Decoration in front of a block: `first` on its first row, `rest` after.
#[derive(Debug, Clone, Default)]
struct Indent {
    first: Vec<Span<'static>>,
    rest: Vec<Span<'static>>,
}

impl Indent {
    fn nested(&self, first: Span<'static>, rest: Span<'static>) -> Self {
        let mut nested = self.clone();
        nested.first.push(first);
        nested.rest.push(rest);
        nested
    }

    fn following(&self) -> Self {
        Self {
            first: self.rest.clone(),
            rest: self.rest.clone(),
        }
    }
}

fn push_rows(out: &mut Vec<PreviewLine>, indent: &Indent, rows: Vec<Row>) {
    for (index, (spans, kind)) in rows.into_iter().enumerate() {
        let prefix = if index == 0 {
            indent.first.clone()
        } else {
            indent.rest.clone()
        };
        out.push(PreviewLine {
            prefix,
            continuation: indent.rest.clone(),
            spans,
            kind,
        });
    }
}

fn blocks<'a>(parent: &'a AstNode<'a>, indent: &Indent, tight: bool, out: &mut Vec<PreviewLine>) {
    let mut current = indent.clone();
    let mut emitted = false;
    for child in parent.children() {
        let start = out.len();
        if emitted && !tight {
            push_rows(out, &current, vec![(Vec::new(), LineKind::Text)]);
        }
        let before = out.len();
        block(child, &current, out);
        if out.len() == before {
            out.truncate(start);
        } else if !emitted {
            emitted = true;
            current = indent.following();
        }
    }
}

fn block<'a>(node: &'a AstNode<'a>, indent: &Indent, out: &mut Vec<PreviewLine>) {
    match &node.data.borrow().value {
        NodeValue::Paragraph => {
            let rows = inline_lines(node, Style::default())
                .into_iter()
                .map(|spans| (spans, LineKind::Text))
                .collect();
            push_rows(out, indent, rows);
        }
        NodeValue::Heading(heading) => {
            let heading_style = style::heading(heading.level);
            let marker = format!("{} ", "#".repeat(usize::from(heading.level)));
            let mut rows: Vec<Row> = inline_lines(node, heading_style)
                .into_iter()
                .map(|spans| (spans, LineKind::Text))
                .collect();
            if let Some((first, _)) = rows.first_mut() {
                first.insert(0, Span::styled(marker, heading_style));
            }
            push_rows(out, indent, rows);
        }
        NodeValue::CodeBlock(code_block) => {
            let language = code_block.info.split_whitespace().next();
            let gutter = || Span::styled("│ ", style::code_gutter());
            let mut rows: Vec<Row> = highlight::highlight_lines(language, &code_block.literal)
                .into_iter()
                .map(|line| {
                    let mut spans = vec![gutter()];
                    spans.extend(line.spans);
                    (spans, LineKind::Code)
                })
                .collect();
            if rows.is_empty() {
                rows.push((vec![gutter()], LineKind::Code));
            }
            push_rows(out, indent, rows);
        }
        NodeValue::BlockQuote => {
            let bar = || Span::styled("│ ", style::quote());
            blocks(node, &indent.nested(bar(), bar()), false, out);
        }
        NodeValue::List(list) => {
            let delimiter = match list.delimiter {
                ListDelimType::Paren => ')',
                ListDelimType::Period => '.',
            };
            let last_number = list.start + node.children().count().saturating_sub(1);
            let number_width = last_number.to_string().len();
            let mut number = list.start;
            let mut first_item = true;
            for item in node.children() {
                let bullet = match list.list_type {
                    ListType::Bullet => "•".to_string(),
                    ListType::Ordered => {
                        format!("{number:>number_width$}{delimiter}")
                    }
                };
                let marker = match &item.data.borrow().value {
                    NodeValue::TaskItem(Some(_)) => format!("{bullet} ☑ "),
                    NodeValue::TaskItem(None) => format!("{bullet} ☐ "),
                    _ => format!("{bullet} "),
                };
                number += 1;

                let current = if first_item {
                    indent.clone()
                } else {
                    indent.following()
                };
                if !first_item && !list.tight {
                    push_rows(out, &current, vec![(Vec::new(), LineKind::Text)]);
                }
                first_item = false;

                let pad = " ".repeat(marker.width());
                let nested =
                    current.nested(Span::styled(marker, style::list_marker()), Span::raw(pad));
                let before = out.len();
                blocks(item, &nested, list.tight, out);
                if out.len() == before {
                    push_rows(out, &nested, vec![(Vec::new(), LineKind::Text)]);
                }
            }
        }
        NodeValue::ThematicBreak => {
            push_rows(
                out,
                indent,
                vec![(vec![Span::styled("─", style::rule())], LineKind::Rule)],
            );
        }
        NodeValue::Table(table) => {
            push_rows(out, indent, table_rows(node, &table.alignments));
        }
        NodeValue::FootnoteDefinition(definition) => {
            let marker = format!("[^{}]: ", definition.name);
            let pad = " ".repeat(marker.width());
            let nested = indent.nested(Span::styled(marker, style::rule()), Span::raw(pad));
            blocks(node, &nested, true, out);
        }
        NodeValue::HtmlBlock(_) | NodeValue::FrontMatter(_) => {}
        _ => blocks(node, indent, false, out),
    }
}

fn table_rows<'a>(table: &'a AstNode<'a>, alignments: &[TableAlignment]) -> Vec<Row> {
    let mut grid: Vec<(bool, Vec<Vec<Span<'static>>>)> = Vec::new();
    for row in table.children() {
        let header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
        let cells = row
            .children()
            .map(|cell| {
                let mut spans = Vec::new();
                for (index, line) in inline_lines(cell, Style::default()).into_iter().enumerate() {
                    if index > 0 {
                        spans.push(Span::raw(" "));
                    }
                    spans.extend(line);
                }
                spans
            })
            .collect();
        grid.push((header, cells));
    }

    let columns = grid.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for (_, cells) in &grid {
        for (column, cell) in cells.iter().enumerate() {
            widths[column] = widths[column].max(spans_width(cell));
        }
    }

    let separator = || Span::styled(" │ ", style::table_border());
    let mut rows = Vec::new();
    for (header, cells) in grid {
        let mut spans = Vec::new();
        for (column, width) in widths.iter().enumerate() {
            if column > 0 {
                spans.push(separator());
            }
            let mut cell = cells.get(column).cloned().unwrap_or_default();
            if header {
                for span in &mut cell {
                    span.style = span.style.add_modifier(Modifier::BOLD);
                }
            }
            let slack = width.saturating_sub(spans_width(&cell));
            let (left, right) = match alignments.get(column).copied().unwrap_or(TableAlignment::None) {
                TableAlignment::Right => (slack, 0),
                TableAlignment::Center => (slack / 2, slack - slack / 2),
                TableAlignment::Left | TableAlignment::None => (0, slack),
            };
            if left > 0 {
                spans.push(Span::raw(" ".repeat(left)));
            }
            spans.extend(cell);
            if right > 0 && column + 1 < widths.len() {
                spans.push(Span::raw(" ".repeat(right)));
            }
        }
        rows.push((spans, LineKind::Code));
        if header {
            let rule = widths
                .iter()
                .map(|width| "─".repeat(*width))
                .collect::<Vec<_>>()
                .join("─┼─");
            rows.push((vec![Span::styled(rule, style::table_border())], LineKind::Code));
        }
    }
    rows
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|span| span.content.width()).sum()
}

/// Inline content of `node`, split at hard line breaks.
fn inline_lines<'a>(node: &'a AstNode<'a>, base: Style) -> Vec<Vec<Span<'static>>> {
    let mut lines = vec![Vec::new()];
    for child in node.children() {
        inline(child, base, &mut lines);
    }
    lines
}

fn push_span(lines: &mut [Vec<Span<'static>>], span: Span<'static>) {
    if let Some(line) = lines.last_mut() {
        line.push(span);
    }
}

fn inline<'a>(node: &'a AstNode<'a>, style: Style, lines: &mut Vec<Vec<Span<'static>>>) {
    let nested = |modifier: Modifier, lines: &mut Vec<Vec<Span<'static>>>| {
        for child in node.children() {
            inline(child, style.add_modifier(modifier), lines);
        }
    };
    match &node.data.borrow().value {
        NodeValue::Text(text) => push_span(lines, Span::styled(text.clone(), style)),
        NodeValue::Code(code) => push_span(
            lines,
            Span::styled(code.literal.clone(), style::inline_code(style)),
        ),
        NodeValue::Emph => nested(Modifier::ITALIC, lines),
        NodeValue::Strong => nested(Modifier::BOLD, lines),
        NodeValue::Strikethrough => nested(Modifier::CROSSED_OUT, lines),
        NodeValue::Link(_) => {
            for child in node.children() {
                inline(child, style::link(style), lines);
            }
        }
        NodeValue::Image(_) => {
            let alt = plain_text(node);
            push_span(lines, Span::styled(format!("[image: {alt}]"), style::image()));
        }
        NodeValue::FootnoteReference(reference) => {
            push_span(lines, Span::styled(format!("[^{}]", reference.name), style));
        }
        NodeValue::SoftBreak => push_span(lines, Span::styled(" ", style)),
        NodeValue::LineBreak => lines.push(Vec::new()),
        NodeValue::HtmlInline(_) => {}
        _ => {
            for child in node.children() {
                inline(child, style, lines);
            }
        }
    }
}

fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(t) => text.push_str(t),
            NodeValue::Code(code) => text.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
            _ => text.push_str(&plain_text(child)),
        }
    }
    text
}
