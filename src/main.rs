//! trunkpilot: guided interactive menu for everyday trunk-based git workflows.
//!
//! This is the main entry point for the `trunkpilot` CLI. It parses arguments,
//! sets up diagnostics, runs the interactive session, and maps errors to
//! exit codes.

use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};
use trunkpilot::cli::Cli;
use trunkpilot::{app, exit_codes, output};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let level = cli.log_level();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
    debug!("Tracing initialized with level: {}", level);

    match app::run(&cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            output::print_error(&err.to_string());
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
