//! Guarded workflow actions.
//!
//! Each action is composed from the repository guard, the trunk
//! synchronizer and the branch name validator, and ends with a push:
//!
//! - [`Action::NewBranch`]: sync trunk, create a branch from it, push it
//! - [`Action::UpdateBranch`]: sync trunk, refresh an existing branch, push it
//! - [`Action::PushToTrunk`]: refresh trunk, confirm, commit and push trunk
//!
//! Actions run to completion or abort; nothing is rolled back.

mod direct_push;
mod new_branch;
mod update_branch;


use crate::error::Result;
use crate::git::{self, run_git};
use crate::guard;
use crate::output;
use crate::prompt::Prompter;
use crate::session::Session;
use std::fmt;
use tracing::{debug, info};

pub use direct_push::commit_all_if_changed;

/// Actions offered by the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NewBranch,
    UpdateBranch,
    PushToTrunk,
}

impl Action {
    /// Menu order.
    pub const ALL: [Action; 3] = [Action::NewBranch, Action::UpdateBranch, Action::PushToTrunk];

    /// Menu label, naming the configured trunk where relevant.
    pub fn label(self, trunk: &str) -> String {
        match self {
            Action::NewBranch => format!("Create a new branch from {} and push it", trunk),
            Action::UpdateBranch => "Update an existing branch and push it".to_string(),
            Action::PushToTrunk => format!("Push directly to {}", trunk),
        }
    }
}

/// How an action that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The final push step ran.
    Done,
    /// The user declined the confirmation; nothing was pushed.
    Declined,
}

/// States of the workflow state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Guarding,
    Syncing,
    AwaitingInput,
    Validating,
    Executing,
    Done,
    Aborted,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Guarding => "guarding",
            WorkflowState::Syncing => "syncing",
            WorkflowState::AwaitingInput => "awaiting-input",
            WorkflowState::Validating => "validating",
            WorkflowState::Executing => "executing",
            WorkflowState::Done => "done",
            WorkflowState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Records state transitions for one session.
#[derive(Debug, Clone)]
pub struct StateTracker {
    history: Vec<WorkflowState>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            history: vec![WorkflowState::Idle],
        }
    }

    pub fn enter(&mut self, state: WorkflowState) {
        debug!(from = %self.current(), to = %state, "workflow transition");
        self.history.push(state);
    }

    pub fn current(&self) -> WorkflowState {
        self.history.last().copied().unwrap_or(WorkflowState::Idle)
    }

    pub fn history(&self) -> &[WorkflowState] {
        &self.history
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one action from guard to push.
///
/// On success the tracker returns to `Idle`. On a fatal error it is left in
/// `Aborted` and the error is returned for the caller to terminate on.
pub fn run_action(
    action: Action,
    session: &Session,
    prompter: &mut dyn Prompter,
    tracker: &mut StateTracker,
) -> Result<ActionOutcome> {
    info!(?action, remote = session.remote(), "running action");

    let result = guarded(action, session, prompter, tracker);

    match result {
        Ok(ActionOutcome::Done) => {
            tracker.enter(WorkflowState::Done);
            tracker.enter(WorkflowState::Idle);
        }
        Ok(ActionOutcome::Declined) => {
            tracker.enter(WorkflowState::Aborted);
            tracker.enter(WorkflowState::Idle);
        }
        Err(_) => tracker.enter(WorkflowState::Aborted),
    }

    result
}

fn guarded(
    action: Action,
    session: &Session,
    prompter: &mut dyn Prompter,
    tracker: &mut StateTracker,
) -> Result<ActionOutcome> {
    tracker.enter(WorkflowState::Guarding);
    guard::preflight(session.repo_root(), session.config())?;

    match action {
        Action::NewBranch => new_branch::run(session, prompter, tracker),
        Action::UpdateBranch => update_branch::run(session, prompter, tracker),
        Action::PushToTrunk => direct_push::run(session, prompter, tracker),
    }
}

/// Push the checked-out branch to the session's remote.
///
/// Returns whether the push succeeded; failures go through the failure policy.
fn push_current_branch(session: &Session, set_upstream: bool) -> Result<bool> {
    let branch = session.current_branch()?;
    let remote = session.remote();

    let branch_ref = git::branch_ref(&branch);
    let refspec = format!("{0}:{0}", branch_ref);
    let mut args = vec!["push"];
    if set_upstream {
        args.push("-u");
    }
    args.extend([remote, refspec.as_str()]);

    output::print_info(&format!(
        "Pushing {} to {}...",
        output::format_branch(&branch),
        output::format_remote(remote)
    ));

    let pushed = session
        .config()
        .failure_policy
        .tolerate("push", run_git(session.repo_root(), &args))?
        .is_some();

    if pushed {
        output::print_success(&format!(
            "Pushed {} to {}.",
            output::format_branch(&branch),
            output::format_remote(remote)
        ));
    }
    Ok(pushed)
}
