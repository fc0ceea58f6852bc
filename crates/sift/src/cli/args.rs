//! Clap argument definitions for the `sift` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Code search over git repositories")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log verbosity (-v for info, -vv for debug); SIFT_LOG overrides
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Arguments for `sift init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `sift index`.
#[derive(Args, Debug, Clone)]
pub struct IndexCommand {
    /// Path to the git repository
    #[arg(default_value = ".")]
    pub repo: PathBuf,

    /// Numeric id the repository is indexed under
    #[arg(long)]
    pub repo_id: i64,

    /// Commit to index
    #[arg(long, default_value = "HEAD")]
    pub commit: String,

    /// Previously indexed commit; only files changed since it are updated
    #[arg(long)]
    pub since: Option<String>,
}

/// Arguments for `sift delete`.
#[derive(Args, Debug, Clone)]
pub struct DeleteCommand {
    /// Repository to remove from the index
    #[arg(long)]
    pub repo_id: i64,
}

/// Arguments for `sift search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Keyword to search for
    pub keyword: String,

    /// Limit results to a repository (can be specified multiple times)
    #[arg(short = 'r', long = "repo")]
    pub repo_ids: Vec<i64>,

    /// Limit results to a language
    #[arg(short = 'l', long)]
    pub language: Option<String>,

    /// Page of results to show
    #[arg(short = 'p', long, default_value = "1")]
    pub page: usize,

    /// Results per page [default: 10]
    #[arg(short = 'n', long)]
    pub page_size: Option<usize>,

    /// Output in JSON format
    #[arg(long, conflicts_with = "html")]
    pub json: bool,

    /// Output rendered HTML snippets
    #[arg(long)]
    pub html: bool,
}

/// Supported `sift` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Search indexed code
    #[command(after_help = "\
MATCHING:
  Keywords are split into terms and matched case-insensitively. Terms of three to five
  characters tolerate one edit, longer terms two.

EXAMPLES:
  sift search parse_config
  sift search 'open index' -l Rust
  sift search handler -r 7 -r 9 --page 2
  sift search handler --json")]
    Search(SearchCommand),

    /// Index a git repository at a commit
    Index(IndexCommand),

    /// Remove a repository from the index
    Delete(DeleteCommand),

    /// Initialize sift configuration in current directory
    Init(InitCommand),

    /// Show status and validate configuration
    Status,

    /// Show effective configuration settings
    Config,
}

impl Commands {
    /// Whether the command needs the configuration loaded before it runs.
    pub fn requires_config(&self) -> bool {
        !matches!(self, Self::Init(_))
    }
}

/// Parses CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use sift_config::SearchSettings;

    use super::*;

    /// Gets help text for a subcommand's argument.
    fn get_arg_help(cmd: &clap::Command, subcmd: &str, arg: &str) -> String {
        cmd.get_subcommands()
            .find(|c| c.get_name() == subcmd)
            .and_then(|c| c.get_arguments().find(|a| a.get_id() == arg))
            .and_then(|a| a.get_help().map(|h| h.to_string()))
            .unwrap_or_default()
    }

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn page_size_help_matches_default() {
        let cmd = Cli::command();
        let help = get_arg_help(&cmd, "search", "page_size");
        let default = SearchSettings::default().page_size;
        assert!(
            help.contains(&format!("[default: {default}]")),
            "search --page-size help should contain default {default}: {help}"
        );
    }

    #[test]
    fn parses_search_filters() {
        let cli = Cli::try_parse_from([
            "sift", "search", "needle", "-r", "3", "-r", "4", "-l", "Go", "--page", "2", "-v",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Commands::Search(cmd) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(cmd.keyword, "needle");
        assert_eq!(cmd.repo_ids, vec![3, 4]);
        assert_eq!(cmd.language.as_deref(), Some("Go"));
        assert_eq!(cmd.page, 2);
        assert_eq!(cmd.page_size, None);
    }

    #[test]
    fn json_and_html_conflict() {
        assert!(Cli::try_parse_from(["sift", "search", "x", "--json", "--html"]).is_err());
    }

    #[test]
    fn index_requires_repo_id() {
        assert!(Cli::try_parse_from(["sift", "index", "."]).is_err());
        let cli = Cli::try_parse_from(["sift", "index", "--repo-id", "5"]).unwrap();
        let Commands::Index(cmd) = cli.command else {
            panic!("expected index");
        };
        assert_eq!(cmd.repo, PathBuf::from("."));
        assert_eq!(cmd.commit, "HEAD");
        assert!(cmd.since.is_none());
    }

    #[test]
    fn init_skips_config_loading() {
        let cli = Cli::try_parse_from(["sift", "init"]).unwrap();
        assert!(!cli.command.requires_config());
        let cli = Cli::try_parse_from(["sift", "status"]).unwrap();
        assert!(cli.command.requires_config());
    }
}
