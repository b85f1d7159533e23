//! Error types for trunkpilot.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for trunkpilot operations.
///
/// Every variant is fatal for the session: `main` prints it and exits with
/// the code returned by [`PilotError::exit_code`].
#[derive(Error, Debug)]
pub enum PilotError {
    /// The user or the environment put the program in an unusable state.
    #[error("{0}")]
    UserError(String),

    /// The configuration file could not be read or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Authenticated transport to the remote could not be established.
    #[error("transport setup failed: {0}")]
    Transport(String),

    /// Unresolved merge conflicts are present in the working tree.
    #[error("unresolved merge conflicts in:\n{}", format_paths(.paths))]
    Conflicts { paths: Vec<String> },

    /// A user-supplied branch name failed validation.
    #[error(
        "invalid branch name '{0}': only letters, digits, '.', '_', '/' and '-' are allowed"
    )]
    InvalidBranchName(String),

    /// Git operation failed.
    #[error("Git operation failed: {0}")]
    GitError(String),
}

fn format_paths(paths: &[String]) -> String {
    paths
        .iter()
        .map(|p| format!("  {}", p))
        .collect::<Vec<_>>()
        .join("\n")
}

impl PilotError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            PilotError::UserError(_)
            | PilotError::Config(_)
            | PilotError::Transport(_)
            | PilotError::Conflicts { .. }
            | PilotError::InvalidBranchName(_) => exit_codes::FATAL,
            PilotError::GitError(_) => exit_codes::GIT_FAILURE,
        }
    }
}

/// Result type alias for trunkpilot operations.
pub type Result<T> = std::result::Result<T, PilotError>;
