//! Remote selection and remote branch listing.

use crate::error::{PilotError, Result};
use crate::git::run_git;
use crate::output;
use crate::prompt::{Prompter, RetryPolicy, select_index};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// List configured remotes in the order git reports them.
pub fn list_remotes<P: AsRef<Path>>(repo_root: P) -> Result<Vec<String>> {
    let output = run_git(repo_root, &["remote"])?;
    Ok(output.lines().into_iter().map(str::to_string).collect())
}

/// Resolve exactly one remote for the session.
///
/// * no remotes: fatal, with a hint on how to add one
/// * `preferred` names a configured remote: used without prompting
/// * one remote: selected without prompting
/// * several remotes: numbered prompt, re-asked per `policy`
pub fn select_remote(
    remotes: &[String],
    preferred: Option<&str>,
    prompter: &mut dyn Prompter,
    policy: RetryPolicy,
) -> Result<String> {
    if remotes.is_empty() {
        return Err(PilotError::UserError(
            "no git remotes are configured.\n\n\
             Add one with: git remote add origin <url>"
                .to_string(),
        ));
    }

    if let Some(name) = preferred {
        if remotes.iter().any(|r| r == name) {
            info!(remote = name, "using requested remote");
            return Ok(name.to_string());
        }
        output::print_warning(&format!(
            "Remote '{}' is not configured; choose one of the available remotes.",
            name
        ));
    }

    if let [only] = remotes {
        output::print_info(&format!("Using remote {}", output::format_remote(only)));
        return Ok(only.clone());
    }

    output::print_header("Available remotes");
    for (i, remote) in remotes.iter().enumerate() {
        println!("  {}) {}", i + 1, output::format_remote(remote));
    }

    let idx = select_index(prompter, "Select a remote:", remotes.len(), policy)?;
    debug!(remote = %remotes[idx], "remote selected");
    Ok(remotes[idx].clone())
}

/// List branch names that exist on `remote`, without the `<remote>/` prefix.
///
/// Uses the local remote-tracking refs, so the result reflects the last fetch.
/// The symbolic `HEAD` entry is skipped; names are de-duplicated and sorted.
pub fn list_remote_branches<P: AsRef<Path>>(repo_root: P, remote: &str) -> Result<Vec<String>> {
    let pattern = format!("{}/*", remote);
    let output = run_git(repo_root, &["branch", "-r", "--list", &pattern])?;
    let prefix = format!("{}/", remote);

    let branches: BTreeSet<String> = output
        .lines()
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.contains(" -> "))
        .filter_map(|line| line.strip_prefix(&prefix))
        .filter(|name| !name.is_empty() && *name != "HEAD")
        .map(str::to_string)
        .collect();

    Ok(branches.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::test_support::{create_test_repo, create_test_repo_with_remote, git};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_remote_is_selected_without_prompt() {
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let remote =
            select_remote(&names(&["origin"]), None, &mut prompter, RetryPolicy::Unbounded)
                .unwrap();
        assert_eq!(remote, "origin");
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn test_zero_remotes_fails_fast() {
        let mut prompter = ScriptedPrompter::new(["1"]);
        let err = select_remote(&[], None, &mut prompter, RetryPolicy::Unbounded).unwrap_err();
        assert!(matches!(err, PilotError::UserError(_)));
        assert!(err.to_string().contains("git remote add"));
    }

    #[test]
    fn test_multiple_remotes_prompt_until_valid() {
        let remotes = names(&["origin", "upstream", "fork"]);
        let mut prompter = ScriptedPrompter::new(["", "7", "2"]);
        let remote = select_remote(&remotes, None, &mut prompter, RetryPolicy::Unbounded).unwrap();
        assert_eq!(remote, "upstream");
        assert_eq!(prompter.asked().len(), 3);
    }

    #[test]
    fn test_multiple_remotes_never_return_unknown_value() {
        let remotes = names(&["origin", "upstream"]);
        let mut prompter = ScriptedPrompter::new(["upstream", "-1", "3"]);
        let err =
            select_remote(&remotes, None, &mut prompter, RetryPolicy::Unbounded).unwrap_err();
        // Input ran out without a valid choice: no value outside the set is returned.
        assert!(err.to_string().contains("input closed"));
    }

    #[test]
    fn test_preferred_remote_skips_prompt() {
        let remotes = names(&["origin", "upstream"]);
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let remote = select_remote(
            &remotes,
            Some("upstream"),
            &mut prompter,
            RetryPolicy::Unbounded,
        )
        .unwrap();
        assert_eq!(remote, "upstream");
    }

    #[test]
    fn test_unknown_preferred_remote_falls_back_to_prompt() {
        let remotes = names(&["origin", "upstream"]);
        let mut prompter = ScriptedPrompter::new(["1"]);
        let remote = select_remote(
            &remotes,
            Some("missing"),
            &mut prompter,
            RetryPolicy::Unbounded,
        )
        .unwrap();
        assert_eq!(remote, "origin");
        assert_eq!(prompter.asked().len(), 1);
    }

    #[test]
    fn test_list_remotes_in_repo() {
        let temp_dir = create_test_repo();
        assert!(list_remotes(temp_dir.path()).unwrap().is_empty());

        git(temp_dir.path(), &["remote", "add", "origin", "/tmp/nowhere"]);
        git(temp_dir.path(), &["remote", "add", "backup", "/tmp/elsewhere"]);
        let mut remotes = list_remotes(temp_dir.path()).unwrap();
        remotes.sort();
        assert_eq!(remotes, vec!["backup", "origin"]);
    }

    #[test]
    fn test_list_remote_branches_strips_prefix_and_sorts() {
        let remote = create_test_repo_with_remote();
        for branch in ["zeta", "bugfix/42", "alpha"] {
            git(&remote.work, &["branch", branch]);
            git(&remote.work, &["push", "origin", branch]);
        }
        git(&remote.work, &["remote", "set-head", "origin", "main"]);

        let branches = list_remote_branches(&remote.work, "origin").unwrap();
        assert_eq!(branches, vec!["alpha", "bugfix/42", "main", "zeta"]);
    }

    #[test]
    fn test_list_remote_branches_filters_other_remotes() {
        let remote = create_test_repo_with_remote();
        git(
            &remote.work,
            &["remote", "add", "mirror", &remote.bare.to_string_lossy()],
        );
        git(&remote.work, &["fetch", "mirror"]);

        let branches = list_remote_branches(&remote.work, "origin").unwrap();
        assert_eq!(branches, vec!["main"]);
    }
}
