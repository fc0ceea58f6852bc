//! Implementation of `sift init`.

use std::{
    fs,
    io::{self, Write},
    path::Path,
    process::ExitCode,
};

use sift_config::{CONFIG_FILENAME, config_template};
use sift_highlight::{Highlighter, header};

use crate::cli::{args::InitCommand, context::CommandContext};

/// Directory entry added to `.gitignore`.
const DATA_PATTERN: &str = ".sift/";

/// Initializes a `.sift.toml` configuration file.
pub fn run(ctx: &CommandContext, cmd: &InitCommand) -> ExitCode {
    let config_path = ctx.cwd.join(CONFIG_FILENAME);

    if config_path.exists() && !cmd.force {
        eprintln!(
            "error: configuration file already exists: {}",
            config_path.display()
        );
        eprintln!("use --force to overwrite");
        return ExitCode::FAILURE;
    }

    let template = config_template();
    if let Err(e) = fs::write(&config_path, &template) {
        eprintln!("error: failed to write {}: {e}", config_path.display());
        return ExitCode::FAILURE;
    }

    println!("Created {}", config_path.display());

    let highlighter = Highlighter::new();
    println!();
    println!("{}", header("Configuration written:"));
    print!("{}", highlighter.highlight_toml(&template));

    if let Err(e) = update_gitignore(&config_path) {
        eprintln!("warning: could not update .gitignore: {e}");
    }

    ExitCode::SUCCESS
}

/// Adds `.sift/` to `.gitignore` if it exists and doesn't already contain it.
fn update_gitignore(config_path: &Path) -> io::Result<()> {
    let Some(parent) = config_path.parent() else {
        return Ok(());
    };

    let gitignore_path = parent.join(".gitignore");
    if !gitignore_path.exists() {
        return Ok(());
    }

    let contents = fs::read_to_string(&gitignore_path)?;
    if contents
        .lines()
        .map(str::trim)
        .any(|line| line == DATA_PATTERN || line == ".sift")
    {
        return Ok(());
    }

    let mut file = fs::OpenOptions::new().append(true).open(&gitignore_path)?;
    if !contents.is_empty() && !contents.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{DATA_PATTERN}")?;
    println!("Added {DATA_PATTERN} to .gitignore");

    Ok(())
}
