//! Create a branch from the freshly synchronized trunk and push it.

use super::{ActionOutcome, StateTracker, WorkflowState, push_current_branch};
use crate::branch_name::validate_branch_name;
use crate::error::{PilotError, Result};
use crate::git::{self, run_git};
use crate::output;
use crate::prompt::{Prompter, ask_line};
use crate::session::Session;
use crate::trunk::sync_trunk;

pub(super) fn run(
    session: &Session,
    prompter: &mut dyn Prompter,
    tracker: &mut StateTracker,
) -> Result<ActionOutcome> {
    tracker.enter(WorkflowState::Syncing);
    sync_trunk(session)?;

    tracker.enter(WorkflowState::AwaitingInput);
    let name = ask_line(prompter, "Enter the new branch name:")?;

    tracker.enter(WorkflowState::Validating);
    validate_branch_name(&name)?;

    tracker.enter(WorkflowState::Executing);
    create_branch_from_head(session, &name)?;
    output::print_success(&format!(
        "Created {} from {}.",
        output::format_branch(&name),
        output::format_branch(session.trunk())
    ));

    push_current_branch(session, true)?;
    Ok(ActionOutcome::Done)
}

fn create_branch_from_head(session: &Session, name: &str) -> Result<()> {
    let repo = session.repo_root();

    if git::local_branch_exists(repo, name) {
        return Err(PilotError::GitError(format!(
            "branch '{}' already exists locally.\n\n\
             Use \"Update an existing branch\" to continue working on it.",
            name
        )));
    }

    run_git(repo, &["checkout", "-b", name])?;

    let current = git::current_branch(repo)?;
    if current != name {
        return Err(PilotError::GitError(format!(
            "expected to be on branch '{}' but HEAD is on '{}'",
            name, current
        )));
    }
    Ok(())
}
