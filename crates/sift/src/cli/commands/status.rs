//! Implementation of `sift status`.

use std::process::ExitCode;

use sift_config::{BackendKind, ConfigWarning, discover_config_files};
use sift_highlight::{dim, header, warning};

use crate::cli::context::CommandContext;

/// Shows configuration files, the backend, and validation warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config = &ctx.config;

    let config_files = discover_config_files(&ctx.cwd);
    println!("{}", header("Config files:"));
    if config_files.is_empty() {
        println!("   {}", dim("(none; using defaults)"));
    } else {
        for path in &config_files {
            println!("   {}", path.display());
        }
    }
    println!();

    println!("{}", header("Backend:"));
    match config.index.backend {
        BackendKind::Tantivy => match config.index_directory() {
            Some(path) => {
                let state = if path.join("meta.json").exists() {
                    "present"
                } else {
                    "not created yet"
                };
                println!("   tantivy {}", dim(&format!("({}, {state})", path.display())));
            }
            None => println!("   tantivy {}", warning("(no index directory)")),
        },
        BackendKind::Elasticsearch => println!(
            "   elasticsearch {}",
            dim(&format!(
                "({}, index {})",
                config.elasticsearch.url, config.elasticsearch.index_name
            ))
        ),
    }
    println!();

    println!("{}", header("Paths:"));
    for pattern in &config.index.include {
        println!("   + {pattern}");
    }
    for pattern in &config.index.exclude {
        println!("   - {pattern}");
    }
    println!();

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return ExitCode::SUCCESS;
    }

    println!("{}", header(&format!("Warnings ({}):", warnings.len())));
    for w in &warnings {
        println!("   {}", warning(&w.to_string()));
    }
    println!();

    print_hints(&warnings);

    ExitCode::FAILURE
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    for w in warnings {
        match w {
            ConfigWarning::InvalidElasticsearchUrl { .. } => {
                println!("{}", dim("Hint: set [elasticsearch] url to http://host:port"));
            }
            ConfigWarning::NoIncludePatterns => {
                println!("{}", dim("Hint: add include = [\"**\"] under [index]"));
            }
            _ => {}
        }
    }
}
