//! Repository pre-flight checks.
//!
//! Every workflow action starts with [`preflight`]: the conflict check runs
//! first so that the clean-tree safeguard never commits conflict markers.

use crate::config::Config;
use crate::error::{PilotError, Result};
use crate::git::{self, run_git};
use crate::output;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Observed state of the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkingTreeState {
    Clean,
    /// Pending changes, one `status --porcelain` line each.
    Dirty(Vec<String>),
    /// Paths with unresolved merge conflicts.
    Conflicted(Vec<String>),
}

/// Result of the clean-tree safeguard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanTree {
    /// Pending changes were staged and committed.
    Committed,
    /// Nothing to do.
    AlreadyClean,
}

/// Fail unless `cwd` is inside a git working tree. Returns the repository root.
pub fn require_inside_repository<P: AsRef<Path>>(cwd: P) -> Result<PathBuf> {
    git::get_repo_root(cwd)
}

/// Paths with unresolved merge conflicts.
fn conflicted_paths<P: AsRef<Path>>(repo_root: P) -> Result<Vec<String>> {
    let output = run_git(repo_root, &["diff", "--name-only", "--diff-filter=U"])?;
    Ok(output.lines().into_iter().map(str::to_string).collect())
}

/// Abort with the full list of conflicted paths if there are any.
pub fn check_conflicts<P: AsRef<Path>>(repo_root: P) -> Result<()> {
    match working_tree_state(repo_root)? {
        WorkingTreeState::Conflicted(paths) => Err(PilotError::Conflicts { paths }),
        state => {
            debug!(?state, "no merge conflicts");
            Ok(())
        }
    }
}

/// Classify the working tree. Conflicts take precedence; untracked files
/// count as dirty.
pub fn working_tree_state<P: AsRef<Path>>(repo_root: P) -> Result<WorkingTreeState> {
    let repo_root = repo_root.as_ref();
    let conflicts = conflicted_paths(repo_root)?;
    if !conflicts.is_empty() {
        return Ok(WorkingTreeState::Conflicted(conflicts));
    }
    pending_changes(repo_root)
}

fn pending_changes(repo_root: &Path) -> Result<WorkingTreeState> {
    let status = run_git(repo_root, &["status", "--porcelain"])?;
    if status.is_empty() {
        Ok(WorkingTreeState::Clean)
    } else {
        Ok(WorkingTreeState::Dirty(
            status.lines().into_iter().map(str::to_string).collect(),
        ))
    }
}

/// Commit every pending change (tracked edits, untracked files, staged
/// changes) with `message` so that a branch switch never carries or loses
/// work. A clean tree is left untouched.
pub fn ensure_clean_tree<P: AsRef<Path>>(repo_root: P, message: &str) -> Result<CleanTree> {
    let repo_root = repo_root.as_ref();
    match pending_changes(repo_root)? {
        WorkingTreeState::Dirty(changes) => commit_pending(repo_root, &changes, message),
        _ => {
            debug!("working tree is clean");
            Ok(CleanTree::AlreadyClean)
        }
    }
}

fn commit_pending(repo_root: &Path, changes: &[String], message: &str) -> Result<CleanTree> {
    output::print_warning("Uncommitted changes detected; committing them before switching branches.");
    info!(changes = changes.len(), "auto-committing pending changes");

    run_git(repo_root, &["add", "-A"])?;
    run_git(repo_root, &["commit", "-m", message]).map_err(|e| {
        PilotError::GitError(format!(
            "failed to auto-commit pending changes: {}\n\n\
             You may need to configure git user.name and user.email:\n\
             git config user.name \"Your Name\"\n\
             git config user.email \"you@example.com\"",
            e
        ))
    })?;

    output::print_success("Changes committed.");
    Ok(CleanTree::Committed)
}

/// Run the conflict check, then the clean-tree safeguard.
pub fn preflight<P: AsRef<Path>>(repo_root: P, config: &Config) -> Result<CleanTree> {
    let repo_root = repo_root.as_ref();
    check_conflicts(repo_root)?;
    ensure_clean_tree(repo_root, &config.auto_commit_message)
}
