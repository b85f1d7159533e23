//! Git command runner.
//!
//! Every git invocation goes through [`run_git`], which captures output, logs
//! the command line and hands child processes the transport environment
//! recorded by the SSH agent bootstrap.

use crate::error::{PilotError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Environment added to every git child process, e.g. the socket of an agent
/// started for this session. Set at most once.
static TRANSPORT_ENV: OnceLock<Vec<(String, String)>> = OnceLock::new();

/// Record the environment git needs to reach the credential agent.
///
/// Returns `false` if an environment was already recorded; the first one wins.
pub fn set_transport_env(vars: Vec<(String, String)>) -> bool {
    TRANSPORT_ENV.set(vars).is_ok()
}

fn transport_env() -> &'static [(String, String)] {
    TRANSPORT_ENV.get().map(Vec::as_slice).unwrap_or(&[])
}

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty()
    }

    pub fn lines(&self) -> Vec<&str> {
        if self.stdout.is_empty() {
            Vec::new()
        } else {
            self.stdout.lines().collect()
        }
    }
}

/// Full ref name of a local branch.
///
/// Passing `refs/heads/<name>` instead of the bare name keeps a name that
/// starts with `-` from being parsed as an option.
pub fn branch_ref(name: &str) -> String {
    format!("refs/heads/{}", name)
}

fn git_command(cwd: &Path, env: &[(String, String)]) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(cwd);
    cmd.envs(env.iter().map(|(key, value)| (key, value)));
    cmd
}

/// Run `git <args>` in `cwd`. A non-zero exit becomes [`PilotError::GitError`].
///
/// ```no_run
/// use trunkpilot::git::run_git;
/// use std::path::Path;
///
/// let output = run_git(Path::new("."), &["status", "--porcelain"])?;
/// println!("Changes: {}", output.stdout);
/// # Ok::<(), trunkpilot::error::PilotError>(())
/// ```
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    run_git_with_env(cwd.as_ref(), args, transport_env())
}

fn run_git_with_env(cwd: &Path, args: &[&str], env: &[(String, String)]) -> Result<GitOutput> {
    debug!(cwd = %cwd.display(), "git {}", args.join(" "));
    let subcommand = args.iter().find(|a| !a.starts_with('-')).unwrap_or(&"");

    let output = git_command(cwd, env).args(args).output().map_err(|e| {
        PilotError::GitError(format!("failed to execute git {}: {}", subcommand, e))
    })?;

    let git_output = GitOutput::from_output(&output);
    trace!(stdout = %git_output.stdout, stderr = %git_output.stderr, "git finished");

    if output.status.success() {
        return Ok(git_output);
    }

    let error_msg = if git_output.stderr.is_empty() {
        &git_output.stdout
    } else {
        &git_output.stderr
    };
    Err(PilotError::GitError(format!(
        "git {} failed (exit code {}): {}",
        subcommand,
        output.status.code().unwrap_or(-1),
        error_msg
    )))
}

/// Repository root of the working tree containing `cwd`.
///
/// Anything short of a working tree (no repository, a bare repository, the
/// inside of `.git/`) is a [`PilotError::UserError`], not a git failure.
pub fn get_repo_root<P: AsRef<Path>>(cwd: P) -> Result<PathBuf> {
    let output = git_command(cwd.as_ref(), &[])
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .map_err(|e| {
            PilotError::UserError(format!("failed to execute git: {} (is git installed?)", e))
        })?;

    let toplevel = GitOutput::from_output(&output).stdout;
    if !output.status.success() || toplevel.is_empty() {
        return Err(PilotError::UserError(
            "not inside a git repository. Run this command from within a git working tree."
                .to_string(),
        ));
    }
    Ok(PathBuf::from(toplevel))
}

/// Get the name of the currently checked-out branch.
///
/// Returns `HEAD` when the repository is in detached-HEAD state.
pub fn current_branch<P: AsRef<Path>>(repo_root: P) -> Result<String> {
    let output = run_git(repo_root, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(output.stdout)
}

/// Check if a branch exists locally.
pub fn local_branch_exists<P: AsRef<Path>>(repo_root: P, branch: &str) -> bool {
    run_git(
        repo_root,
        &["rev-parse", "--verify", "--quiet", &branch_ref(branch)],
    )
    .is_ok()
}
