//! HTML and terminal escaping for rendered snippets.

/// Appends `text` to `out` with the five HTML-significant characters escaped.
///
/// Escapes `&`, `<`, `>`, `'` and `"`, so the output is safe both as element content and
/// inside quoted attribute values.
pub fn escape_html_into(text: &str, out: &mut String) {
    let mut last = 0;
    for (idx, byte) in text.bytes().enumerate() {
        let replacement = match byte {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'\'' => "&#39;",
            b'"' => "&#34;",
            _ => continue,
        };
        out.push_str(&text[last..idx]);
        out.push_str(replacement);
        last = idx + 1;
    }
    out.push_str(&text[last..]);
}

/// Returns an escaped copy of `text`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_into(text, &mut out);
    out
}

/// Appends `text` to `out` with control characters replaced by U+FFFD, so file content cannot
/// inject terminal escape sequences. Tabs, newlines and the `\r` of a `\r\n` pair are kept.
pub fn escape_terminal_into(text: &str, out: &mut String) {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let kept = match c {
            '\n' | '\t' => true,
            '\r' => chars.peek() == Some(&'\n'),
            _ => !c.is_control(),
        };
        out.push(if kept { c } else { char::REPLACEMENT_CHARACTER });
    }
}

/// Returns a copy of `text` that is safe to write to a terminal.
pub fn escape_terminal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_terminal_into(text, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&#34;x&#34;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn leaves_plain_and_multibyte_text_alone() {
        assert_eq!(escape_html("fn größe() -> ñ"), "fn größe() -&gt; ñ");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn appends_to_existing_buffer() {
        let mut out = String::from("x");
        escape_html_into("<", &mut out);
        assert_eq!(out, "x&lt;");
    }

    #[test]
    fn terminal_escaping_replaces_control_characters() {
        assert_eq!(
            escape_terminal("a\x1b[31mb\x07\r\x7f"),
            "a\u{FFFD}[31mb\u{FFFD}\u{FFFD}\u{FFFD}"
        );
        assert_eq!(escape_terminal("tab\there\r\n"), "tab\there\r\n");
        assert_eq!(escape_terminal("größe <>"), "größe <>");
    }
}
