//! Transport readiness gate.
//!
//! Makes sure an SSH agent is reachable and holds the configured key before
//! any command talks to a remote. An agent started here outlives the program;
//! its socket is handed to git child processes rather than written into this
//! process's environment.

use crate::config::TransportConfig;
use crate::error::{PilotError, Result};
use crate::output;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Environment variable naming the agent socket.
pub const AUTH_SOCK_VAR: &str = "SSH_AUTH_SOCK";

/// Environment variable naming the agent process.
pub const AGENT_PID_VAR: &str = "SSH_AGENT_PID";

/// Outcome of [`ensure_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Agent reachable and the key already loaded; nothing was changed.
    AlreadySatisfied,
    /// Agent reachable; the key was registered.
    IdentityAdded,
    /// A new agent was started and the key registered with it.
    AgentStarted,
}

/// Operations the gate needs from a credential agent.
pub trait AgentControl {
    /// Whether an agent answers on the ambient socket.
    fn is_reachable(&self) -> bool;

    /// Start a new agent; later calls on this value talk to it.
    fn start(&mut self) -> Result<()>;

    /// Whether `key` is already loaded into the agent.
    fn has_identity(&self, key: &Path) -> bool;

    /// Register `key` with the agent.
    fn add_identity(&mut self, key: &Path) -> Result<()>;
}

/// Establish authenticated transport, doing only the work that is missing.
///
/// A missing credential file is fatal and is checked before the agent is touched.
pub fn ensure_ready(credential: &Path, agent: &mut dyn AgentControl) -> Result<Readiness> {
    if !credential.is_file() {
        return Err(PilotError::Transport(format!(
            "credential file '{}' not found.\n\n\
             Create a key with: ssh-keygen -t ed25519 -f {}\n\
             or point transport.credential_path in .trunkpilot.yaml at an existing key.",
            credential.display(),
            credential.display()
        )));
    }

    let started = if agent.is_reachable() {
        debug!("agent already reachable");
        false
    } else {
        output::print_info("Starting SSH agent...");
        agent.start()?;
        true
    };

    if !started && agent.has_identity(credential) {
        debug!(key = %credential.display(), "identity already loaded");
        return Ok(Readiness::AlreadySatisfied);
    }

    agent.add_identity(credential)?;
    output::print_success(&format!("Key {} added to the agent.", credential.display()));

    Ok(if started {
        Readiness::AgentStarted
    } else {
        Readiness::IdentityAdded
    })
}

/// `ssh-agent`/`ssh-add` backed agent control.
#[derive(Debug, Clone)]
pub struct SshAgent {
    agent_argv: Vec<String>,
    add_argv: Vec<String>,
    exported: Vec<(String, String)>,
}

impl SshAgent {
    /// Build from configuration, splitting the commands with shell quoting rules.
    pub fn from_config(config: &TransportConfig) -> Result<Self> {
        Ok(Self {
            agent_argv: split_command("transport.agent_command", &config.agent_command)?,
            add_argv: split_command("transport.add_command", &config.add_command)?,
            exported: Vec::new(),
        })
    }

    /// Variables printed by an agent started through [`AgentControl::start`].
    ///
    /// Empty when the ambient agent was used.
    pub fn exported_env(&self) -> &[(String, String)] {
        &self.exported
    }

    fn auth_sock(&self) -> Option<std::ffi::OsString> {
        match self.exported.iter().find(|(k, _)| k == AUTH_SOCK_VAR) {
            Some((_, sock)) => Some(sock.into()),
            None => std::env::var_os(AUTH_SOCK_VAR).filter(|s| !s.is_empty()),
        }
    }

    fn add_command(&self) -> Command {
        let mut cmd = Command::new(&self.add_argv[0]);
        cmd.args(&self.add_argv[1..]);
        cmd.envs(self.exported.iter().map(|(key, value)| (key, value)));
        cmd
    }

    fn loaded_identities(&self) -> Option<String> {
        let output = self.add_command().arg("-l").stdin(Stdio::null()).output().ok()?;
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl AgentControl for SshAgent {
    fn is_reachable(&self) -> bool {
        let Some(sock) = self.auth_sock() else {
            return false;
        };
        if !Path::new(&sock).exists() {
            return false;
        }

        // `ssh-add -l` exits 2 when it cannot reach an agent and 1 when the
        // agent simply holds no identities.
        match self.add_command().arg("-l").stdin(Stdio::null()).output() {
            Ok(output) => output.status.code() != Some(2),
            Err(e) => {
                warn!(error = %e, "failed to query agent");
                false
            }
        }
    }

    fn start(&mut self) -> Result<()> {
        let output = Command::new(&self.agent_argv[0])
            .args(&self.agent_argv[1..])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                PilotError::Transport(format!("failed to run '{}': {}", self.agent_argv[0], e))
            })?;

        if !output.status.success() {
            return Err(PilotError::Transport(format!(
                "'{}' failed: {}",
                self.agent_argv.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let vars = parse_agent_env(&String::from_utf8_lossy(&output.stdout));
        if !vars.iter().any(|(k, _)| k == AUTH_SOCK_VAR) {
            return Err(PilotError::Transport(format!(
                "'{}' did not report {}",
                self.agent_argv.join(" "),
                AUTH_SOCK_VAR
            )));
        }

        for (key, value) in &vars {
            info!(%key, %value, "agent started");
        }
        self.exported = vars;
        Ok(())
    }

    fn has_identity(&self, key: &Path) -> bool {
        let Some(fingerprint) = key_fingerprint(key) else {
            return false;
        };
        self.loaded_identities()
            .is_some_and(|listed| listed.lines().any(|line| line.contains(&fingerprint)))
    }

    fn add_identity(&mut self, key: &Path) -> Result<()> {
        // stdin stays attached so ssh-add can ask for a passphrase.
        let status = self.add_command().arg(key).status().map_err(|e| {
            PilotError::Transport(format!("failed to run '{}': {}", self.add_argv[0], e))
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(PilotError::Transport(format!(
                "could not add '{}' to the SSH agent (exit code {})",
                key.display(),
                status.code().unwrap_or(-1)
            )))
        }
    }
}

fn split_command(field: &str, command: &str) -> Result<Vec<String>> {
    let argv = shell_words::split(command).map_err(|e| {
        PilotError::Config(format!(
            "failed to parse {} '{}': {}\n\
             Fix: check for unmatched quotes or invalid escape sequences.",
            field, command, e
        ))
    })?;

    if argv.is_empty() {
        return Err(PilotError::Config(format!(
            "{} is empty after parsing: '{}'",
            field, command
        )));
    }
    Ok(argv)
}

/// Extract `NAME=value;` assignments from `ssh-agent -s` output.
pub fn parse_agent_env(stdout: &str) -> Vec<(String, String)> {
    stdout
        .split(['\n', ';'])
        .map(str::trim)
        .filter_map(|part| part.split_once('='))
        .filter(|(key, _)| *key == AUTH_SOCK_VAR || *key == AGENT_PID_VAR)
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// SHA256 fingerprint of a key as printed by `ssh-keygen -l`.
fn key_fingerprint(key: &Path) -> Option<String> {
    let output = Command::new("ssh-keygen")
        .arg("-lf")
        .arg(key)
        .stdin(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
}
