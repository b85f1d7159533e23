//! Confirmed direct push to the trunk branch.

use super::{ActionOutcome, StateTracker, WorkflowState, push_current_branch};
use crate::error::Result;
use crate::git::run_git;
use crate::output;
use crate::prompt::{Prompter, confirm};
use crate::session::Session;
use crate::trunk::{pull_branch, switch_to};
use std::path::Path;

pub(super) fn run(
    session: &Session,
    prompter: &mut dyn Prompter,
    tracker: &mut StateTracker,
) -> Result<ActionOutcome> {
    let repo = session.repo_root();
    let remote = session.remote();
    let trunk = session.trunk();

    tracker.enter(WorkflowState::Syncing);
    switch_to(repo, remote, trunk)?;
    session
        .config()
        .failure_policy
        .tolerate("pull", pull_branch(repo, remote, trunk))?;

    tracker.enter(WorkflowState::AwaitingInput);
    output::print_warning(&format!(
        "This pushes straight to {} on {} without a review branch.",
        output::format_branch(trunk),
        output::format_remote(remote)
    ));
    let question = format!("Push directly to {}?", trunk);
    if !confirm(prompter, &question)? {
        output::print_info("Cancelled; nothing was pushed.");
        return Ok(ActionOutcome::Declined);
    }

    tracker.enter(WorkflowState::Executing);
    if commit_all_if_changed(repo, &session.config().direct_push_message())? {
        output::print_success("Committed pending changes.");
    }

    push_current_branch(session, false)?;
    Ok(ActionOutcome::Done)
}

/// Stage everything and commit with `message` if anything is staged.
///
/// Returns whether a commit was created; an unchanged tree yields no empty commit.
pub fn commit_all_if_changed<P: AsRef<Path>>(repo_root: P, message: &str) -> Result<bool> {
    let repo_root = repo_root.as_ref();

    run_git(repo_root, &["add", "-A"])?;
    let staged = run_git(repo_root, &["diff", "--cached", "--name-only"])?;
    if staged.is_empty() {
        return Ok(false);
    }

    run_git(repo_root, &["commit", "-m", message])?;
    Ok(true)
}
