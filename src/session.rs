//! Session context threaded through every workflow action.

use crate::config::Config;
use crate::error::Result;
use crate::git;
use std::path::{Path, PathBuf};

/// State for one invocation of the program.
///
/// The remote is chosen once and never changes; the current branch is not
/// cached because every action moves it.
#[derive(Debug, Clone)]
pub struct Session {
    repo_root: PathBuf,
    remote: String,
    config: Config,
}

impl Session {
    pub fn new(repo_root: PathBuf, remote: String, config: Config) -> Self {
        Self {
            repo_root,
            remote,
            config,
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shortcut for the configured trunk branch name.
    pub fn trunk(&self) -> &str {
        &self.config.trunk_branch
    }

    /// Branch currently checked out in the repository.
    pub fn current_branch(&self) -> Result<String> {
        git::current_branch(&self.repo_root)
    }
}
