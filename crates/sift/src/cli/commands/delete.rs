//! Implementation of `sift delete`.

use std::process::ExitCode;

use sift_highlight::success;

use crate::cli::{args::DeleteCommand, context::CommandContext};

/// Removes every indexed file of a repository.
pub fn run(ctx: &mut CommandContext, cmd: &DeleteCommand) -> ExitCode {
    let indexer = match ctx.indexer() {
        Ok(indexer) => indexer,
        Err(code) => return code,
    };

    if let Err(e) = indexer.delete(cmd.repo_id) {
        eprintln!("error: failed to delete repository {}: {e}", cmd.repo_id);
        return ExitCode::FAILURE;
    }

    println!("{}", success(&format!("Deleted repository {}", cmd.repo_id)));
    ExitCode::SUCCESS
}
