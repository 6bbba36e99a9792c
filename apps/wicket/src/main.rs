//! Wicket binary entry point.

use clap::Parser;
use std::process::ExitCode;
use wicket::cli::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    wicket::logging::init(cli.global.verbose);

    match cli::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
