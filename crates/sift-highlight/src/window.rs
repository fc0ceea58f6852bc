//! Snippet window selection around a match.

use std::ops::Range;

/// Computes the byte range of `content` shown around the match region `span`.
///
/// The window covers every line touched by the match plus up to `context_lines` complete lines
/// above and below it. It starts at the beginning of a line (or the start of the content) and
/// ends just before a newline (or at the end of the content), so
/// `window.start <= span.start <= span.end <= window.end` always holds.
pub fn snippet_window(content: &str, span: Range<usize>, context_lines: usize) -> Range<usize> {
    let bytes = content.as_bytes();
    let start = span.start.min(bytes.len());
    let end = span.end.clamp(start, bytes.len());

    let mut window_start = start;
    let mut seen = 0;
    while window_start > 0 {
        if bytes[window_start - 1] == b'\n' {
            if seen == context_lines {
                break;
            }
            seen += 1;
        }
        window_start -= 1;
    }

    // A match that swallows its own trailing newline has already closed its last line.
    let mut seen = usize::from(end > start && bytes[end - 1] == b'\n');
    let mut window_end = end;
    while window_end < bytes.len() {
        if bytes[window_end] == b'\n' {
            if seen >= context_lines {
                break;
            }
            seen += 1;
        }
        window_end += 1;
    }

    window_start..window_end
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "line1\nline2\nMATCHhere\nline4\nline5\nline6\n";

    #[test]
    fn two_lines_of_context_each_side() {
        let window = snippet_window(SAMPLE, 12..17, 2);
        assert_eq!(window, 0..33);
        assert_eq!(&SAMPLE[window], "line1\nline2\nMATCHhere\nline4\nline5");
    }

    #[test]
    fn context_is_clipped_at_content_edges() {
        let content = "MATCH\nnext";
        assert_eq!(snippet_window(content, 0..5, 2), 0..content.len());
    }

    #[test]
    fn newline_free_content_is_one_window() {
        let content = "let x = MATCH + y";
        let start = content.find("MATCH").unwrap();
        for context in 0..3 {
            assert_eq!(snippet_window(content, start..start + 5, context), 0..content.len());
        }
    }

    #[test]
    fn zero_context_shows_only_match_lines() {
        let window = snippet_window(SAMPLE, 14..16, 0);
        assert_eq!(&SAMPLE[window], "MATCHhere");
    }

    #[test]
    fn starts_after_a_newline_when_content_precedes() {
        let content = "a\nb\nc\nd\nMATCH\ne\n";
        let window = snippet_window(content, 8..13, 2);
        assert_eq!(&content[window], "c\nd\nMATCH\ne\n");
    }

    #[test]
    fn match_spanning_lines_keeps_all_of_them() {
        let content = "a\nb\nstart\nmiddle\nend\nc\nd\ne";
        let start = content.find("art").unwrap();
        let end = content.find("end").unwrap() + 2;
        let window = snippet_window(content, start..end, 1);
        assert_eq!(&content[window], "b\nstart\nmiddle\nend\nc");
    }

    #[test]
    fn match_ending_in_newline_does_not_gain_extra_line() {
        let window = snippet_window(SAMPLE, 12..22, 2);
        assert_eq!(&SAMPLE[window], "line1\nline2\nMATCHhere\nline4\nline5");
    }

    #[test]
    fn window_always_contains_span() {
        let content = "x\n\n\nyy\nzzz\n\nw";
        for start in 0..content.len() {
            for end in start..=content.len() {
                for context in 0..3 {
                    let window = snippet_window(content, start..end, context);
                    assert!(window.start <= start && end <= window.end);
                    assert!(window.start == 0 || content.as_bytes()[window.start - 1] == b'\n');
                    assert!(
                        window.end == content.len() || content.as_bytes()[window.end] == b'\n'
                    );
                }
            }
        }
    }
}
