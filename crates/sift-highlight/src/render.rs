//! Line-by-line snippet rendering with active match markup.

use std::ops::Range;

use syntect::util::LinesWithEndings;

use crate::{
    colors,
    escape::{escape_html_into, escape_terminal_into},
};

/// Output dialect for rendered snippets.
pub trait Markup {
    /// Appends plain content text.
    fn text(&self, text: &str, out: &mut String);

    /// Appends matched content text.
    fn active(&self, text: &str, out: &mut String);

    /// Wraps one fully rendered line.
    fn line(&self, body: String) -> String;
}

/// Escaped HTML: one `<li>` per line, matches in `<span class='active'>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMarkup;

impl Markup for HtmlMarkup {
    fn text(&self, text: &str, out: &mut String) {
        escape_html_into(text, out);
    }

    fn active(&self, text: &str, out: &mut String) {
        out.push_str("<span class='active'>");
        escape_html_into(text, out);
        out.push_str("</span>");
    }

    fn line(&self, body: String) -> String {
        format!("<li>{body}</li>")
    }
}

/// ANSI terminal output with matches in bold yellow. Control characters in content are
/// replaced before they reach the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalMarkup;

impl Markup for TerminalMarkup {
    fn text(&self, text: &str, out: &mut String) {
        escape_terminal_into(text, out);
    }

    fn active(&self, text: &str, out: &mut String) {
        out.push_str(colors::BOLD);
        out.push_str(colors::YELLOW);
        escape_terminal_into(text, out);
        out.push_str(colors::RESET);
    }

    fn line(&self, body: String) -> String {
        body
    }
}

/// A rendered window of file content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedSnippet {
    /// 1-based line numbers, parallel to `lines`.
    pub line_numbers: Vec<usize>,
    /// Rendered lines, each carrying its original trailing newline inside the markup.
    pub lines: Vec<String>,
}

impl RenderedSnippet {
    /// Concatenates the rendered lines into one string.
    pub fn joined(&self) -> String {
        self.lines.concat()
    }
}

/// Renders `content[window]` line by line, marking up the parts covered by `spans`.
///
/// Spans are absolute byte offsets into `content`, sorted ascending and non-overlapping (see
/// [`usable_spans`](crate::usable_spans)). A span crossing a line break is clipped per line and
/// reappears at the start of the following line. `window` must lie on character boundaries.
pub fn render_snippet<M: Markup + ?Sized>(
    content: &str,
    window: Range<usize>,
    spans: &[Range<usize>],
    markup: &M,
) -> RenderedSnippet {
    let Some(windowed) = content.get(window.clone()) else {
        return RenderedSnippet::default();
    };
    let first_line = 1 + content.as_bytes()[..window.start]
        .iter()
        .filter(|&&b| b == b'\n')
        .count();

    let mut rendered = RenderedSnippet::default();
    let mut next = 0;
    let mut index = window.start;

    for (offset, line) in LinesWithEndings::from(windowed).enumerate() {
        let line_end = index + line.len();
        let mut body = String::with_capacity(line.len());
        let mut pos = 0;

        while let Some(span) = spans.get(next) {
            if span.end <= span.start || span.end <= index + pos {
                next += 1;
                continue;
            }
            if span.start >= line_end || pos >= line.len() {
                break;
            }
            let open = span.start.saturating_sub(index).max(pos);
            let close = (span.end - index).min(line.len());
            markup.text(&line[pos..open], &mut body);
            markup.active(&line[open..close], &mut body);
            pos = close;
        }
        markup.text(&line[pos..], &mut body);

        rendered.lines.push(markup.line(body));
        rendered.line_numbers.push(first_line + offset);
        index = line_end;
    }

    rendered
}
