//! Implementation of `sift search`.

use std::process::ExitCode;

use sift_highlight::TerminalMarkup;
use sift_index::{CodeSearch, SearchRequest};

use crate::cli::{
    args::SearchCommand,
    context::CommandContext,
    output::{print_html_page, print_json, print_terminal_page},
};

/// Searches the index and prints highlighted snippets.
pub fn run(ctx: &mut CommandContext, cmd: &SearchCommand) -> ExitCode {
    let indexer = match ctx.indexer() {
        Ok(indexer) => indexer,
        Err(code) => return code,
    };
    let search = CodeSearch::new(indexer, ctx.config.search.clone());

    let request = SearchRequest {
        repo_ids: cmd.repo_ids.clone(),
        language: cmd.language.clone().unwrap_or_default(),
        keyword: cmd.keyword.clone(),
        page: cmd.page,
        page_size: cmd.page_size,
    };

    let page = if cmd.json || cmd.html {
        search.search(&request)
    } else {
        search.search_with(&request, &TerminalMarkup)
    };
    let page = match page {
        Ok(page) => page,
        Err(e) => {
            eprintln!("error: search failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.json {
        return print_json(&page);
    }
    if cmd.html {
        print_html_page(&page);
    } else {
        print_terminal_page(&page, cmd.page.max(1));
    }
    ExitCode::SUCCESS
}
