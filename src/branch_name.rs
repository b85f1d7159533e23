//! Branch name validation.
//!
//! Every user-supplied branch name passes through [`validate_branch_name`]
//! before it reaches a git command line.

use crate::error::{PilotError, Result};
use regex::Regex;
use std::sync::LazyLock;

static BRANCH_NAME: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[a-zA-Z0-9._/-]+$").unwrap()
});

/// Accept only non-empty names made of ASCII letters, digits, `.`, `_`, `/` and `-`.
pub fn validate_branch_name(name: &str) -> Result<()> {
    if BRANCH_NAME.is_match(name) {
        Ok(())
    } else {
        Err(PilotError::InvalidBranchName(name.to_string()))
    }
}
