//! Exit code constants for the trunkpilot CLI.
//!
//! - 0: Success (the user chose to exit the menu)
//! - 1: Fatal precondition (not a repository, missing credential, agent
//!   registration failure, unresolved conflicts, invalid branch name,
//!   invalid configuration)
//! - 3: Git operation failure that the active failure policy refused to tolerate

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Fatal precondition failure.
pub const FATAL: i32 = 1;

/// Git operation failure: fetch, pull, push, checkout or commit errors.
pub const GIT_FAILURE: i32 = 3;
