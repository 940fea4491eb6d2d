//! HTML output helpers: the code block highlighter plugged into comrak's
//! formatter, and text escaping for the standalone page.

use std::collections::HashMap;
use std::io::{self, Write};

use comrak::adapters::SyntaxHighlighterAdapter;
use comrak::html::{escape as escape_into, write_opening_tag};

use crate::highlight;

/// Highlights fenced code blocks as comrak formats them.
///
/// A block whose language is missing or unknown is written as plain
/// escaped text, so one bad block never affects the others.
pub(super) struct CodeHighlighter;

impl SyntaxHighlighterAdapter for CodeHighlighter {
    fn write_highlighted(
        &self,
        output: &mut dyn Write,
        lang: Option<&str>,
        code: &str,
    ) -> io::Result<()> {
        let highlighted = lang
            .filter(|lang| !lang.is_empty())
            .and_then(|lang| highlight::highlight_html(lang, code));
        match highlighted {
            Some(markup) => output.write_all(markup.as_bytes()),
            None => escape_into(output, code.as_bytes()),
        }
    }

    fn write_pre_tag(
        &self,
        output: &mut dyn Write,
        attributes: HashMap<String, String>,
    ) -> io::Result<()> {
        write_opening_tag(output, "pre", attributes)
    }

    fn write_code_tag(
        &self,
        output: &mut dyn Write,
        attributes: HashMap<String, String>,
    ) -> io::Result<()> {
        write_opening_tag(output, "code", attributes)
    }
}

/// Escape text for use in HTML content or attributes.
pub(super) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
