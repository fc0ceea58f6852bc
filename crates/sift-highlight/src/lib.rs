//! Result highlighting for sift.
//!
//! This crate turns a stored file plus a list of match spans into a bounded, line-numbered
//! snippet with the matches marked up. The pipeline is:
//!
//! 1. [`char_to_byte_spans`] converts character-ordinal spans (as reported by Elasticsearch)
//!    into byte offsets.
//! 2. [`usable_spans`] drops spans that cannot be sliced and merges the rest.
//! 3. [`snippet_window`] picks the lines around the matched region.
//! 4. [`render_snippet`] walks the window line by line, escaping content through a [`Markup`].
//!
//! It also provides language classification for indexed files, and syntax-highlighted terminal
//! output for the CLI.

#![warn(missing_docs)]

mod escape;
mod language;
mod render;
mod spans;
mod window;

pub use escape::{escape_html, escape_html_into, escape_terminal, escape_terminal_into};
pub use language::{
    DEFAULT_COLOR, LanguageDetector, NO_HIGHLIGHT, UNKNOWN_LANGUAGE, is_text, language_color,
};
pub use render::{HtmlMarkup, Markup, RenderedSnippet, TerminalMarkup, render_snippet};
pub use spans::{char_to_byte_spans, merge_ranges, usable_spans};
use syntect::{
    easy::HighlightLines,
    highlighting::Style,
    parsing::SyntaxSet,
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use two_face::{
    syntax::extra_newlines as extra_syntaxes,
    theme::{EmbeddedLazyThemeSet, EmbeddedThemeName, extra as extra_themes},
};
pub use window::snippet_window;

/// A syntax highlighter that can highlight code for terminal output.
pub struct Highlighter {
    /// The syntax set containing language definitions.
    syntax_set: SyntaxSet,
    /// The theme set containing color themes.
    theme_set: EmbeddedLazyThemeSet,
    /// The theme to use.
    theme: EmbeddedThemeName,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Creates a new highlighter with the default theme (Dracula).
    pub fn new() -> Self {
        Self {
            syntax_set: extra_syntaxes(),
            theme_set: extra_themes(),
            theme: EmbeddedThemeName::Dracula,
        }
    }

    /// Highlights TOML content for terminal output.
    pub fn highlight_toml(&self, content: &str) -> String {
        self.highlight(content, "toml")
    }

    /// Highlights content with the specified syntax for terminal output.
    ///
    /// `syntax_name` may be an extension or a syntax name. If the syntax is not found, the
    /// content is returned with plain text styling.
    pub fn highlight(&self, content: &str, syntax_name: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_extension(syntax_name)
            .or_else(|| self.syntax_set.find_syntax_by_name(syntax_name))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self.theme_set.get(self.theme);
        let mut highlighter = HighlightLines::new(syntax, theme);

        let mut output = String::new();
        for line in LinesWithEndings::from(content) {
            let ranges: Vec<(Style, &str)> = highlighter
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_else(|_| vec![(Style::default(), line)]);
            output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
        }
        output.push_str(colors::RESET);
        output
    }
}

/// ANSI color codes for terminal output.
pub mod colors {
    /// Bold text.
    pub const BOLD: &str = "\x1b[1m";
    /// Cyan text (for headers).
    pub const CYAN: &str = "\x1b[36m";
    /// Green text (for success).
    pub const GREEN: &str = "\x1b[32m";
    /// Yellow text (for warnings and matches).
    pub const YELLOW: &str = "\x1b[33m";
    /// Red text (for errors).
    pub const RED: &str = "\x1b[31m";
    /// Dim/gray text (for less important info).
    pub const DIM: &str = "\x1b[2m";
    /// Reset all formatting.
    pub const RESET: &str = "\x1b[0m";
}

/// Formats a header with bold cyan styling.
pub fn header(text: &str) -> String {
    format!("{}{}{}{}", colors::BOLD, colors::CYAN, text, colors::RESET)
}

/// Formats text as dimmed/less important.
pub fn dim(text: &str) -> String {
    format!("{}{}{}", colors::DIM, text, colors::RESET)
}

/// Formats text as a success message (green).
pub fn success(text: &str) -> String {
    format!("{}{}{}", colors::GREEN, text, colors::RESET)
}

/// Formats text as a warning (yellow).
pub fn warning(text: &str) -> String {
    format!("{}{}{}", colors::YELLOW, text, colors::RESET)
}

/// Wraps text in a hex color given as `#rrggbb`, falling back to plain text.
pub fn hex_color(text: &str, hex: &str) -> String {
    let channels = hex
        .strip_prefix('#')
        .filter(|h| h.len() == 6 && h.is_ascii())
        .and_then(|h| {
            let channel = |i: usize| u8::from_str_radix(&h[i..i + 2], 16).ok();
            Some((channel(0)?, channel(2)?, channel(4)?))
        });
    match channels {
        Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m{text}{}", colors::RESET),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlighter_toml() {
        let hl = Highlighter::new();
        let output = hl.highlight_toml("[search]\npage_size = 10\n");
        assert!(output.contains("\x1b["));
        assert!(output.ends_with(colors::RESET));
    }

    #[test]
    fn test_highlighter_unknown_syntax_keeps_text() {
        let hl = Highlighter::new();
        let output = hl.highlight("just words\n", "no-such-syntax");
        assert!(output.contains("just words"));
    }

    #[test]
    fn test_header_formatting() {
        let h = header("Test");
        assert!(h.contains(colors::BOLD));
        assert!(h.contains(colors::CYAN));
        assert!(h.contains("Test"));
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("Go", "#00ADD8"), "\x1b[38;2;0;173;216mGo\x1b[0m");
        assert_eq!(hex_color("Go", "teal"), "Go");
        assert_eq!(hex_color("Go", "#zzzzzz"), "Go");
    }

    #[test]
    fn test_pipeline_on_multibyte_content() {
        let content = "// größe\nlet größe = 1;\nprintln!(\"{größe}\");\n";
        // "größe" on the second line starts at character 13.
        let spans = char_to_byte_spans(content, &[13..18]);
        let spans = usable_spans(content, &spans);
        assert_eq!(&content[spans[0].clone()], "größe");

        let window = snippet_window(content, spans[0].start..spans[0].end, 0);
        let rendered = render_snippet(content, window, &spans, &HtmlMarkup);
        assert_eq!(rendered.line_numbers, vec![2]);
        assert_eq!(
            rendered.joined(),
            "<li>let <span class='active'>größe</span> = 1;</li>"
        );
    }
}
