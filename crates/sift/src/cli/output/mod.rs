//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;
use sift_highlight::{dim, escape_html, escape_terminal, header, hex_color};
use sift_index::{DisplayResult, LanguageFacet, SearchPage};

/// Prints a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints a page rendered with terminal markup.
pub fn print_terminal_page(page: &SearchPage, page_number: usize) {
    if page.results.is_empty() {
        println!("{}", dim("No results found."));
        return;
    }

    for result in &page.results {
        print!("{}", format_terminal_result(result));
        println!();
    }

    println!(
        "{}",
        dim(&format!(
            "{} matching files, page {page_number}",
            page.total
        ))
    );

    if !page.languages.is_empty() {
        println!();
        println!("{}", header("Languages:"));
        println!("{}", facet_table(&page.languages));
    }
}

/// Formats one result as a colored header followed by numbered lines.
fn format_terminal_result(result: &DisplayResult) -> String {
    let mut out = format!(
        "{} {} {}\n",
        header(&escape_terminal(&result.path)),
        hex_color(&result.language, &result.color),
        dim(&escape_terminal(&format!(
            "repo {} @ {}",
            result.repo_id, result.commit_id
        )))
    );

    let width = result
        .line_numbers
        .last()
        .map_or(1, |n| n.to_string().len());
    for (number, line) in result.line_numbers.iter().zip(&result.lines) {
        let line = line.replace(['\r', '\n'], "");
        out.push_str(&format!(
            "{} {line}\n",
            dim(&format!("{number:>width$} │"))
        ));
    }
    out
}

/// Builds the language facet table.
fn facet_table(languages: &[LanguageFacet]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Language", "Color", "Files"]);
    for facet in languages {
        table.add_row(vec![
            Cell::new(&facet.language),
            Cell::new(&facet.color),
            Cell::new(facet.count.to_string()),
        ]);
    }
    table
}

/// Prints a page rendered as HTML, one ordered list per result.
pub fn print_html_page(page: &SearchPage) {
    for result in &page.results {
        println!("{}", format_html_result(result));
    }
}

/// Wraps a result's rendered lines in a numbered list.
fn format_html_result(result: &DisplayResult) -> String {
    let start = result.line_numbers.first().copied().unwrap_or(1);
    format!(
        "<div class=\"result\" data-repo=\"{}\" data-path=\"{}\">\n<ol start=\"{start}\" class=\"{}\">{}</ol>\n</div>",
        result.repo_id,
        escape_html(&result.path),
        escape_html(&result.highlight_class),
        result.rendered
    )
}
