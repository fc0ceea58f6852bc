//! Language detection, display colors and text classification for indexed files.

use std::path::Path;

use syntect::parsing::{SyntaxReference, SyntaxSet};
use two_face::syntax::extra_newlines as extra_syntaxes;

/// Language label for files no syntax definition recognizes.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// CSS class for content that should not be syntax highlighted.
pub const NO_HIGHLIGHT: &str = "nohighlight";

/// Color shown for languages without an entry in the color table.
pub const DEFAULT_COLOR: &str = "#cccccc";

/// Number of leading bytes inspected for NUL bytes by [`is_text`].
const SNIFF_LEN: usize = 8000;

/// Syntax names that differ from the conventional language label.
const NAME_ALIASES: &[(&str, &str)] = &[
    ("Bourne Again Shell (bash)", "Shell"),
    ("JavaScript (Babel)", "JavaScript"),
    ("TypeScriptReact", "TSX"),
    ("Rust Enhanced", "Rust"),
];

/// Display colors per language label.
const LANGUAGE_COLORS: &[(&str, &str)] = &[
    ("C", "#555555"),
    ("C#", "#178600"),
    ("C++", "#f34b7d"),
    ("CSS", "#563d7c"),
    ("Clojure", "#db5855"),
    ("D", "#ba595e"),
    ("Dart", "#00B4AB"),
    ("Dockerfile", "#384d54"),
    ("Elixir", "#6e4a7e"),
    ("Erlang", "#B83998"),
    ("Go", "#00ADD8"),
    ("Groovy", "#4298b8"),
    ("HTML", "#e34c26"),
    ("Haskell", "#5e5086"),
    ("Java", "#b07219"),
    ("JavaScript", "#f1e05a"),
    ("JSON", "#292929"),
    ("Kotlin", "#A97BFF"),
    ("Lua", "#000080"),
    ("Makefile", "#427819"),
    ("Markdown", "#083fa1"),
    ("Nix", "#7e7eff"),
    ("OCaml", "#ef7a08"),
    ("Objective-C", "#438eff"),
    ("PHP", "#4F5D95"),
    ("Perl", "#0298c3"),
    ("Python", "#3572A5"),
    ("R", "#198CE7"),
    ("Ruby", "#701516"),
    ("Rust", "#dea584"),
    ("SQL", "#e38c00"),
    ("Scala", "#c22d40"),
    ("Shell", "#89e051"),
    ("Swift", "#F05138"),
    ("TOML", "#9c4221"),
    ("TSX", "#3178c6"),
    ("TypeScript", "#3178c6"),
    ("Vue", "#41b883"),
    ("XML", "#0060ac"),
    ("YAML", "#cb171e"),
    ("Zig", "#ec915c"),
];

/// Extensions of files that are never indexed as text.
const BINARY_EXTENSIONS: &[&str] = &[
    // Compiled/executable
    "exe", "dll", "so", "dylib", "o", "a", "lib", "obj", "class", "pyc", "pyo", "wasm",
    // Archives
    "zip", "tar", "gz", "bz2", "xz", "7z", "rar", "jar", "war", "ear", // Images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff", "psd",
    // Audio/Video
    "mp3", "mp4", "wav", "flac", "ogg", "avi", "mkv", "mov", "wmv", "webm",
    // Documents (binary)
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", // Databases
    "db", "sqlite", "mdb", // Fonts
    "ttf", "otf", "woff", "woff2", "eot", // Other binary formats
    "bin", "dat", "pak", "bundle",
];

/// Extensions whose content is shown without syntax highlighting.
const PLAIN_EXTENSIONS: &[&str] = &["txt", "text", "log"];

/// How a syntax definition was matched to a path.
enum SyntaxMatch<'a> {
    /// Matched on the whole file name, e.g. `Makefile`.
    FileName(&'a SyntaxReference),
    /// Matched on the file extension.
    Extension(&'a SyntaxReference),
}

/// Classifies files by language using syntect's syntax definitions.
pub struct LanguageDetector {
    /// Syntax definitions, including the two-face extras (TOML, TypeScript, Dockerfile...).
    syntax_set: SyntaxSet,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector {
    /// Creates a detector with the bundled syntax definitions.
    pub fn new() -> Self {
        Self {
            syntax_set: extra_syntaxes(),
        }
    }

    /// Returns the language label for a file, or [`UNKNOWN_LANGUAGE`].
    ///
    /// The file name and extension are tried first; when neither is recognized, the first line
    /// of `content` (a shebang or modeline) decides.
    pub fn detect(&self, path: &str, content: &str) -> String {
        let syntax = match self.syntax_for_path(path) {
            Some(SyntaxMatch::FileName(syntax) | SyntaxMatch::Extension(syntax)) => Some(syntax),
            None => content
                .lines()
                .next()
                .and_then(|first| self.syntax_set.find_syntax_by_first_line(first)),
        };

        match syntax {
            Some(syntax) if syntax.name != "Plain Text" => normalize_name(&syntax.name),
            _ => String::from(UNKNOWN_LANGUAGE),
        }
    }

    /// Returns the CSS class a client-side highlighter uses for this file.
    ///
    /// Files recognized by name use the lowercased name, files recognized by extension use the
    /// extension. Everything else, including plain text, gets [`NO_HIGHLIGHT`].
    pub fn highlight_class(&self, path: &str) -> String {
        let file = Path::new(path);
        let extension = file
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        if extension
            .as_deref()
            .is_some_and(|ext| PLAIN_EXTENSIONS.contains(&ext))
        {
            return String::from(NO_HIGHLIGHT);
        }

        match self.syntax_for_path(path) {
            Some(SyntaxMatch::FileName(_)) => file
                .file_name()
                .and_then(|n| n.to_str())
                .map_or_else(|| String::from(NO_HIGHLIGHT), str::to_lowercase),
            Some(SyntaxMatch::Extension(_)) => {
                extension.unwrap_or_else(|| String::from(NO_HIGHLIGHT))
            }
            None => String::from(NO_HIGHLIGHT),
        }
    }

    /// Finds the syntax for a repository path by file name, then by extension.
    fn syntax_for_path(&self, path: &str) -> Option<SyntaxMatch<'_>> {
        let file = Path::new(path);
        if let Some(syntax) = file
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| self.syntax_set.find_syntax_by_extension(name))
        {
            return Some(SyntaxMatch::FileName(syntax));
        }
        file.extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.syntax_set.find_syntax_by_extension(ext))
            .map(SyntaxMatch::Extension)
    }
}

/// Maps a syntax definition name to its conventional language label.
fn normalize_name(name: &str) -> String {
    NAME_ALIASES
        .iter()
        .find(|(syntax, _)| *syntax == name)
        .map_or(name, |(_, label)| label)
        .to_string()
}

/// Returns the display color for a language label.
pub fn language_color(language: &str) -> &'static str {
    LANGUAGE_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(language))
        .map_or(DEFAULT_COLOR, |(_, color)| color)
}

/// Decides whether a file's bytes are text worth indexing.
///
/// Files with a known binary extension, or with a NUL byte near the start, are not text.
pub fn is_text(path: &str, bytes: &[u8]) -> bool {
    let binary_extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
    if binary_extension {
        return false;
    }
    !bytes[..bytes.len().min(SNIFF_LEN)].contains(&0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_extension() {
        let detector = LanguageDetector::new();
        assert_eq!(detector.detect("src/main.rs", ""), "Rust");
        assert_eq!(detector.detect("cmd/server.go", ""), "Go");
        assert_eq!(detector.detect("lib/app.py", ""), "Python");
        assert_eq!(detector.detect("Cargo.toml", ""), "TOML");
    }

    #[test]
    fn detects_by_shebang() {
        let detector = LanguageDetector::new();
        assert_eq!(detector.detect("bin/run", "#!/usr/bin/env python\nprint(1)\n"), "Python");
    }

    #[test]
    fn unknown_files() {
        let detector = LanguageDetector::new();
        assert_eq!(detector.detect("data.unknownext", "hello"), UNKNOWN_LANGUAGE);
        assert_eq!(detector.detect("notes.txt", "hello"), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn highlight_classes() {
        let detector = LanguageDetector::new();
        assert_eq!(detector.highlight_class("src/lib.rs"), "rs");
        assert_eq!(detector.highlight_class("src/Main.JAVA"), "java");
        assert_eq!(detector.highlight_class("README.txt"), NO_HIGHLIGHT);
        assert_eq!(detector.highlight_class("blob.zzz"), NO_HIGHLIGHT);
        assert_eq!(detector.highlight_class("LICENSE"), NO_HIGHLIGHT);
    }

    #[test]
    fn colors() {
        assert_eq!(language_color("Go"), "#00ADD8");
        assert_eq!(language_color("rust"), "#dea584");
        assert_eq!(language_color(UNKNOWN_LANGUAGE), DEFAULT_COLOR);
    }

    #[test]
    fn text_classification() {
        assert!(is_text("main.rs", b"fn main() {}\n"));
        assert!(is_text("Makefile", b"all:\n\tcc main.c\n"));
        assert!(!is_text("logo.png", b"not really an image"));
        assert!(!is_text("blob", b"ELF\0\x01\x02"));
        assert!(is_text("empty.rs", b""));
    }

    #[test]
    fn nul_beyond_sniff_window_is_ignored() {
        let mut bytes = vec![b'a'; SNIFF_LEN];
        bytes.push(0);
        assert!(is_text("big.c", &bytes));
    }
}
