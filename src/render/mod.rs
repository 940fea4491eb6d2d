//! Markdown to preview rendering.
//!
//! One comrak parse produces both outputs of a render: the HTML document
//! (with syntax-highlighted code blocks) and the styled logical lines the
//! terminal preview pane displays. Rendering is a pure function of the text.
//!
//! ```
//! use marksplit::render::render;
//!
//! let rendered = render("# Title\n\nBody").unwrap();
//! assert!(rendered.html().contains("<h1>"));
//! assert!(!rendered.is_placeholder());
//! ```

mod html;
mod style;
mod terminal;

use std::panic::{self, AssertUnwindSafe};

use comrak::{Arena, Options, Plugins, format_html_with_plugins, parse_document};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use thiserror::Error;

/// What the preview shows for a blank buffer.
pub const PLACEHOLDER_HTML: &str = "<div class=\"empty-state\">Preview</div>";

/// Text of the terminal placeholder line.
pub const PLACEHOLDER_TEXT: &str = "Preview";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("markdown engine panicked: {0}")]
    EnginePanic(String),
    #[error("could not format html: {0}")]
    Format(#[from] std::io::Error),
}

/// How a logical preview line behaves when laid out at a pane width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Prose, wrapped at word boundaries.
    Text,
    /// Code, wrapped at the exact column.
    Code,
    /// Horizontal rule, stretched to the pane width.
    Rule,
}

/// One styled line of the terminal preview, before wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewLine {
    /// Leading decoration (list marker, quote bar) for the first visual row.
    pub prefix: Vec<Span<'static>>,
    /// Decoration repeated on wrapped continuation rows.
    pub continuation: Vec<Span<'static>>,
    pub spans: Vec<Span<'static>>,
    pub kind: LineKind,
}

impl PreviewLine {
    pub fn text(spans: Vec<Span<'static>>) -> Self {
        Self {
            prefix: Vec::new(),
            continuation: Vec::new(),
            spans,
            kind: LineKind::Text,
        }
    }

    pub fn blank() -> Self {
        Self::text(Vec::new())
    }

    pub fn content(&self) -> String {
        let mut out = String::new();
        for span in self.prefix.iter().chain(&self.spans) {
            out.push_str(&span.content);
        }
        out
    }
}

/// The output of one render.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    html: String,
    lines: Vec<PreviewLine>,
    placeholder: bool,
}

impl Rendered {
    /// The empty-state render.
    pub fn placeholder() -> Self {
        Self {
            html: PLACEHOLDER_HTML.to_string(),
            lines: vec![PreviewLine::text(vec![Span::styled(
                PLACEHOLDER_TEXT,
                Style::default().add_modifier(Modifier::DIM),
            )])],
            placeholder: true,
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn lines(&self) -> &[PreviewLine] {
        &self.lines
    }

    pub const fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Render markdown text.
///
/// Blank input (empty or whitespace only) yields [`Rendered::placeholder`].
/// Code blocks in a known language are highlighted; a block that fails to
/// highlight is left plain without affecting the rest of the document.
///
/// # Errors
/// Returns [`RenderError`] if the markdown engine fails. Callers keep their
/// previous render in that case, see [`Preview`].
pub fn render(text: &str) -> Result<Rendered, RenderError> {
    if text.trim().is_empty() {
        return Ok(Rendered::placeholder());
    }
    panic::catch_unwind(AssertUnwindSafe(|| render_document(text)))
        .map_err(|payload| RenderError::EnginePanic(panic_message(payload.as_ref())))?
}

fn render_document(text: &str) -> Result<Rendered, RenderError> {
    let arena = Arena::new();
    let mut options = Options::default();
    configure_options(&mut options);
    let root = parse_document(&arena, text, &options);

    let highlighter = html::CodeHighlighter;
    let mut plugins = Plugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&highlighter);

    let mut out = Vec::new();
    format_html_with_plugins(root, &options, &mut out, &plugins)?;
    let html = String::from_utf8_lossy(&out).into_owned();
    let lines = terminal::preview_lines(root);

    Ok(Rendered {
        html,
        lines,
        placeholder: false,
    })
}

fn configure_options(options: &mut Options) {
    // GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;

    // Raw HTML in the source is dropped from the output.
    options.render.unsafe_ = false;
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A self-contained HTML page for a render, with the highlight stylesheet
/// inlined.
pub fn standalone_html(rendered: &Rendered, title: &str) -> String {
    let title = html::escape(title);
    let css = crate::highlight::stylesheet();
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>\n{css}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        rendered.html()
    )
}

/// The preview pane's content: the latest successful render.
///
/// A failed render is logged and leaves the previous output in place.
#[derive(Debug, Clone)]
pub struct Preview {
    current: Rendered,
    renders: u64,
}

impl Default for Preview {
    fn default() -> Self {
        Self::new()
    }
}

impl Preview {
    pub fn new() -> Self {
        Self {
            current: Rendered::placeholder(),
            renders: 0,
        }
    }

    /// Re-render from `text`. Returns false if rendering failed.
    pub fn refresh(&mut self, text: &str) -> bool {
        self.refresh_with(text, render)
    }

    /// Re-render from `text` with the given renderer.
    pub fn refresh_with<F>(&mut self, text: &str, renderer: F) -> bool
    where
        F: FnOnce(&str) -> Result<Rendered, RenderError>,
    {
        match renderer(text) {
            Ok(rendered) => {
                self.current = rendered;
                self.renders += 1;
                true
            }
            Err(err) => {
                tracing::warn!("render failed, keeping previous preview: {err}");
                false
            }
        }
    }

    pub fn current(&self) -> &Rendered {
        &self.current
    }

    /// Number of successful renders since creation.
    pub const fn render_count(&self) -> u64 {
        self.renders
    }
}
