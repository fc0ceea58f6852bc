//! Implementation of `sift index`.

use std::process::ExitCode;

use sift_highlight::{dim, success};
use sift_index::{Changeset, GitRepository, IndexError};
use tracing::info;

use crate::cli::{args::IndexCommand, context::CommandContext};

/// Indexes a repository at a commit, fully or relative to an earlier commit.
pub fn run(ctx: &mut CommandContext, cmd: &IndexCommand) -> ExitCode {
    let repo = match GitRepository::open(&cmd.repo) {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (commit, changes) = match plan_changes(&repo, cmd) {
        Ok(planned) => planned,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if changes.is_empty() {
        println!("{}", dim("No changes to index."));
        return ExitCode::SUCCESS;
    }

    let indexer = match ctx.indexer() {
        Ok(indexer) => indexer,
        Err(code) => return code,
    };

    if let Err(e) = indexer.index(cmd.repo_id, &commit, &changes, &repo) {
        eprintln!("error: indexing failed: {e}");
        return ExitCode::FAILURE;
    }

    println!(
        "{} {}",
        success(&format!(
            "Indexed repository {} at {}",
            cmd.repo_id,
            short_commit(&commit)
        )),
        dim(&format!(
            "({} updated, {} removed)",
            changes.updates.len(),
            changes.removed.len()
        ))
    );
    ExitCode::SUCCESS
}

/// Resolves the target commit and collects the files to write.
fn plan_changes(
    repo: &GitRepository,
    cmd: &IndexCommand,
) -> Result<(String, Changeset), IndexError> {
    let commit = repo.resolve(&cmd.commit)?;
    let changes = match &cmd.since {
        Some(since) => {
            let base = repo.resolve(since)?;
            info!(base = %base, commit = %commit, "indexing changes since base commit");
            repo.diff_changeset(&base, &commit)?
        }
        None => repo.full_changeset(&commit)?,
    };
    Ok((commit, changes))
}

/// Abbreviates a commit hash for display.
fn short_commit(commit: &str) -> &str {
    commit.get(..7).unwrap_or(commit)
}
