//! The interactive menu loop driving the workflow actions.

use crate::actions::{Action, ActionOutcome, StateTracker, run_action};
use crate::error::Result;
use crate::output;
use crate::prompt::{Prompter, select_index};
use crate::session::Session;
use tracing::info;

/// One entry of the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Run(Action),
    Exit,
}

/// Menu entries in display order.
pub fn menu_choices() -> Vec<MenuChoice> {
    Action::ALL
        .into_iter()
        .map(MenuChoice::Run)
        .chain(std::iter::once(MenuChoice::Exit))
        .collect()
}

/// Offer the actions until the user exits.
///
/// At most one action runs per iteration. A fatal error ends the loop and is
/// returned; a declined confirmation returns to the menu.
pub fn run_menu(session: &Session, prompter: &mut dyn Prompter) -> Result<()> {
    let choices = menu_choices();
    let policy = session.config().retry_policy();
    let mut tracker = StateTracker::new();

    loop {
        let branch = session
            .current_branch()
            .unwrap_or_else(|_| "(unknown)".to_string());
        output::print_header(&format!(
            "On {} | remote {}",
            output::format_branch(&branch),
            output::format_remote(session.remote())
        ));
        for (i, choice) in choices.iter().enumerate() {
            let label = match choice {
                MenuChoice::Run(action) => action.label(session.trunk()),
                MenuChoice::Exit => "Exit".to_string(),
            };
            println!("  {}) {}", i + 1, label);
        }

        let idx = select_index(prompter, "Choose an option:", choices.len(), policy)?;
        match choices[idx] {
            MenuChoice::Exit => {
                info!("user exit");
                output::print_info("Goodbye.");
                return Ok(());
            }
            MenuChoice::Run(action) => {
                if run_action(action, session, prompter, &mut tracker)? == ActionOutcome::Done {
                    info!(?action, "action completed");
                }
            }
        }
    }
}
