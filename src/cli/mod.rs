//! CLI argument parsing for trunkpilot.
//!
//! Uses clap derive macros for declarative argument definitions. There are
//! no subcommands: every workflow is chosen from the interactive menu.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// trunkpilot: guided menu for everyday trunk-based git workflows.
///
/// Offers three guarded flows from an interactive menu:
/// - create a branch from an up-to-date trunk and push it
/// - refresh an existing branch from the remote and push it
/// - push directly to the trunk after confirmation
#[derive(Parser, Debug)]
#[command(name = "trunkpilot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: .trunkpilot.yaml at the repository root).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Remote to use without prompting, when it is configured.
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// Increase diagnostic output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Diagnostic level selected by the verbosity flag.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
