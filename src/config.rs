//! Configuration model for trunkpilot.
//!
//! This module defines the Config struct that represents `.trunkpilot.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for every field, and validation of config values.

use crate::branch_name::validate_branch_name;
use crate::error::{PilotError, Result};
use crate::prompt::RetryPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Config file looked up at the repository root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = ".trunkpilot.yaml";

/// How failures of fetch, pull and push are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Print a warning and continue with the next step (default).
    #[default]
    BestEffort,
    /// Abort the session with a git error.
    Strict,
}

impl FailurePolicy {
    /// Apply the policy to the result of an external step.
    ///
    /// Returns `Ok(Some(value))` on success, `Ok(None)` when the failure was
    /// tolerated, and the original error when the policy is strict.
    pub fn tolerate<T>(self, step: &str, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => match self {
                FailurePolicy::BestEffort => {
                    warn!(step, error = %err, "tolerating failed step");
                    crate::output::print_warning(&format!("{} failed, continuing: {}", step, err));
                    Ok(None)
                }
                FailurePolicy::Strict => Err(err),
            },
        }
    }
}

/// Settings for the transport readiness gate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Whether to bootstrap an SSH agent before anything else.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Private key registered with the agent. A leading `~` is expanded.
    #[serde(default = "default_credential_path")]
    pub credential_path: String,

    /// Command that starts an agent and prints its environment in sh syntax.
    #[serde(default = "default_agent_command")]
    pub agent_command: String,

    /// Command that registers a key with the agent (the key path is appended).
    #[serde(default = "default_add_command")]
    pub add_command: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            credential_path: default_credential_path(),
            agent_command: default_agent_command(),
            add_command: default_add_command(),
        }
    }
}

impl TransportConfig {
    /// Credential path with `~` expanded to the user's home directory.
    pub fn resolved_credential_path(&self) -> PathBuf {
        expand_home(&self.credential_path)
    }
}

/// Configuration for a trunkpilot session.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the trunk branch (default: "main").
    #[serde(default = "default_trunk_branch")]
    pub trunk_branch: String,

    /// Commit message used by the clean-tree safeguard.
    #[serde(default = "default_auto_commit_message")]
    pub auto_commit_message: String,

    /// Commit message used by the direct-to-trunk push. When unset it is
    /// derived from the trunk name; see [`Config::direct_push_message`].
    #[serde(default)]
    pub direct_push_commit_message: Option<String>,

    /// Treatment of fetch/pull/push failures.
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Maximum attempts for interactive selections (unset means unbounded).
    #[serde(default)]
    pub prompt_retry_limit: Option<u32>,

    #[serde(default)]
    pub transport: TransportConfig,
}

fn default_trunk_branch() -> String {
    "main".to_string()
}
fn default_auto_commit_message() -> String {
    "Auto-save changes before switching branches".to_string()
}
fn default_credential_path() -> String {
    "~/.ssh/id_ed25519".to_string()
}
fn default_agent_command() -> String {
    "ssh-agent -s".to_string()
}
fn default_add_command() -> String {
    "ssh-add".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trunk_branch: default_trunk_branch(),
            auto_commit_message: default_auto_commit_message(),
            direct_push_commit_message: None,
            failure_policy: FailurePolicy::default(),
            prompt_retry_limit: None,
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    /// Resolve the configuration for a session.
    ///
    /// An explicit path must exist. Otherwise `.trunkpilot.yaml` at the
    /// repository root is used when present, falling back to defaults.
    pub fn discover(explicit: Option<&Path>, repo_root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = repo_root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "loading repository config");
            Self::load(candidate)
        } else {
            debug!("no config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load config from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            PilotError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| PilotError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values and return error on invalid values.
    pub fn validate(&self) -> Result<()> {
        validate_branch_name(&self.trunk_branch).map_err(|_| {
            PilotError::Config(format!(
                "trunk_branch '{}' is not a valid branch name",
                self.trunk_branch
            ))
        })?;

        let direct_push_message = self.direct_push_message();
        for (field, value) in [
            ("auto_commit_message", &self.auto_commit_message),
            ("direct_push_commit_message", &direct_push_message),
            ("transport.credential_path", &self.transport.credential_path),
            ("transport.agent_command", &self.transport.agent_command),
            ("transport.add_command", &self.transport.add_command),
        ] {
            if value.trim().is_empty() {
                return Err(PilotError::Config(format!("{} must not be empty", field)));
            }
        }

        if self.prompt_retry_limit == Some(0) {
            return Err(PilotError::Config(
                "prompt_retry_limit must be greater than 0 (omit it for unlimited retries)"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Commit message for the direct-to-trunk push, e.g. "Direct update to main".
    pub fn direct_push_message(&self) -> String {
        match &self.direct_push_commit_message {
            Some(message) => message.clone(),
            None => format!("Direct update to {}", self.trunk_branch),
        }
    }

    /// Retry policy for interactive selections.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self.prompt_retry_limit {
            Some(limit) => RetryPolicy::Limited(limit),
            None => RetryPolicy::Unbounded,
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };

    match (rest, directories::BaseDirs::new()) {
        (Some(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => PathBuf::from(path),
    }
}
