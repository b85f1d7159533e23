//! Refresh an existing branch from the remote and push it back.

use super::{ActionOutcome, StateTracker, WorkflowState, push_current_branch};
use crate::branch_name::validate_branch_name;
use crate::error::Result;
use crate::output;
use crate::prompt::{Prompter, ask_line};
use crate::remote::list_remote_branches;
use crate::session::Session;
use crate::trunk::{Switched, fetch_remote, pull_branch, switch_to, sync_trunk};

pub(super) fn run(
    session: &Session,
    prompter: &mut dyn Prompter,
    tracker: &mut StateTracker,
) -> Result<ActionOutcome> {
    let repo = session.repo_root();
    let remote = session.remote();

    tracker.enter(WorkflowState::Syncing);
    sync_trunk(session)?;
    fetch_remote(session)?;

    let branches = list_remote_branches(repo, remote)?;
    if branches.is_empty() {
        output::print_warning(&format!(
            "No branches found on {}.",
            output::format_remote(remote)
        ));
    } else {
        output::print_header(&format!("Branches on {}", remote));
        for branch in &branches {
            println!("  {}", output::format_branch(branch));
        }
    }

    tracker.enter(WorkflowState::AwaitingInput);
    let name = ask_line(prompter, "Enter the branch to update:")?;

    tracker.enter(WorkflowState::Validating);
    validate_branch_name(&name)?;

    tracker.enter(WorkflowState::Executing);
    if !branches.contains(&name) {
        output::print_warning(&format!(
            "{} is not on {}; using the local branch.",
            output::format_branch(&name),
            output::format_remote(remote)
        ));
    }

    if switch_to(repo, remote, &name)? == Switched::CreatedFromRemote {
        output::print_info(&format!(
            "Created local {} tracking {}/{}.",
            output::format_branch(&name),
            remote,
            name
        ));
    }

    let pulled = session
        .config()
        .failure_policy
        .tolerate("pull", pull_branch(repo, remote, &name))?
        .is_some();
    if pulled {
        output::print_success(&format!("{} is up to date.", output::format_branch(&name)));
    }

    push_current_branch(session, false)?;
    Ok(ActionOutcome::Done)
}
