//! Program startup: repository check, transport gate, remote selection,
//! then the menu loop.

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{PilotError, Result};
use crate::git;
use crate::guard;
use crate::menu;
use crate::prompt::{Prompter, TerminalPrompter};
use crate::remote;
use crate::session::Session;
use crate::transport::{self, SshAgent};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};

/// Run a full interactive session from the current directory.
pub fn run(cli: &Cli) -> Result<()> {
    let cwd = env::current_dir().map_err(|e| {
        PilotError::UserError(format!("failed to get current working directory: {}", e))
    })?;

    let repo_root = guard::require_inside_repository(&cwd)?;
    let config = Config::discover(cli.config.as_deref(), &repo_root)?;

    if config.transport.enabled {
        let mut agent = SshAgent::from_config(&config.transport)?;
        let readiness =
            transport::ensure_ready(&config.transport.resolved_credential_path(), &mut agent)?;
        info!(?readiness, "transport ready");
        if !agent.exported_env().is_empty() {
            git::set_transport_env(agent.exported_env().to_vec());
        }
    } else {
        debug!("transport gate disabled by configuration");
    }

    let mut prompter = TerminalPrompter::new();
    let session = open_session(repo_root, config, cli.remote.as_deref(), &mut prompter)?;
    menu::run_menu(&session, &mut prompter)
}

/// Select the session's remote and build the session.
pub fn open_session(
    repo_root: PathBuf,
    config: Config,
    preferred_remote: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<Session> {
    let remotes = remote::list_remotes(&repo_root)?;
    let selected =
        remote::select_remote(&remotes, preferred_remote, prompter, config.retry_policy())?;
    info!(remote = %selected, "session opened");
    Ok(Session::new(repo_root, selected, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::test_support::{create_test_repo, create_test_repo_with_remote, git};

    #[test]
    fn test_open_session_with_single_remote() {
        let remote = create_test_repo_with_remote();
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

        let session =
            open_session(remote.work.clone(), Config::default(), None, &mut prompter).unwrap();
        assert_eq!(session.remote(), "origin");
    }

    #[test]
    fn test_open_session_prompts_between_remotes() {
        let remote = create_test_repo_with_remote();
        git(
            &remote.work,
            &["remote", "add", "upstream", &remote.bare.to_string_lossy()],
        );
        let remotes = remote::list_remotes(&remote.work).unwrap();
        let upstream_pos = remotes.iter().position(|r| r == "upstream").unwrap();
        let mut prompter = ScriptedPrompter::new(["0", (upstream_pos + 1).to_string().as_str()]);

        let session =
            open_session(remote.work.clone(), Config::default(), None, &mut prompter).unwrap();
        assert_eq!(session.remote(), "upstream");
    }

    #[test]
    fn test_open_session_without_remotes_fails() {
        let temp_dir = create_test_repo();
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

        let err = open_session(
            temp_dir.path().to_path_buf(),
            Config::default(),
            None,
            &mut prompter,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no git remotes"));
    }
}
