//! Command-line interface for the `sift` code search tool.

use std::process::ExitCode;

use sift::cli::{args::parse_cli, commands, context::CommandContext, logging};

fn main() -> ExitCode {
    let cli = parse_cli();
    logging::init(cli.verbose);

    let ctx = if cli.command.requires_config() {
        CommandContext::load()
    } else {
        CommandContext::load_cwd_only()
    };
    let mut ctx = match ctx {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let code = commands::run(cli.command, &mut ctx);
    if let Err(e) = ctx.close() {
        eprintln!("error: failed to close index: {e}");
        return ExitCode::FAILURE;
    }
    code
}
