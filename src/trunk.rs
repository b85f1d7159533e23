//! Trunk synchronization and verified branch switching.

use crate::error::{PilotError, Result};
use crate::git::{self, GitOutput, run_git};
use crate::output;
use crate::session::Session;
use std::path::Path;
use tracing::debug;

/// How a branch ended up checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switched {
    /// The local branch already existed.
    Existing,
    /// A local branch was created tracking `<remote>/<branch>`.
    CreatedFromRemote,
}

/// What happened during a trunk synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrunkSync {
    pub fetched: bool,
    pub switched: Switched,
    pub pulled: bool,
}

/// Check out `branch`, creating it from `<remote>/<branch>` when it does not
/// exist locally.
///
/// The switch is verified: if HEAD is not on `branch` afterwards the call
/// fails, so that nothing is ever pushed from the wrong branch. A name
/// starting with `-` is refused before git sees it.
pub fn switch_to<P: AsRef<Path>>(repo_root: P, remote: &str, branch: &str) -> Result<Switched> {
    let repo_root = repo_root.as_ref();

    if branch.starts_with('-') {
        return Err(PilotError::GitError(format!(
            "'{}' is not a valid branch name: it would be read as an option",
            branch
        )));
    }

    let switched = if git::local_branch_exists(repo_root, branch) {
        run_git(repo_root, &["checkout", branch])?;
        Switched::Existing
    } else {
        let upstream = format!("{}/{}", remote, branch);
        run_git(repo_root, &["checkout", "--track", "-b", branch, &upstream]).map_err(|e| {
            PilotError::GitError(format!(
                "branch '{}' exists neither locally nor as '{}': {}",
                branch, upstream, e
            ))
        })?;
        Switched::CreatedFromRemote
    };

    let current = git::current_branch(repo_root)?;
    if current != branch {
        return Err(PilotError::GitError(format!(
            "expected to be on branch '{}' but HEAD is on '{}'",
            branch, current
        )));
    }

    debug!(branch, ?switched, "switched branch");
    Ok(switched)
}

/// Merge `<remote>/<branch>` into the checked-out branch.
pub fn pull_branch(repo_root: &Path, remote: &str, branch: &str) -> Result<GitOutput> {
    run_git(repo_root, &["pull", remote, &git::branch_ref(branch)])
}

/// Fetch every branch of the session's remote, pruning deleted ones, so that
/// branches pushed by others since the last fetch can be listed and tracked.
///
/// Failures go through the session's failure policy.
pub fn fetch_remote(session: &Session) -> Result<bool> {
    let remote = session.remote();
    let fetched = session
        .config()
        .failure_policy
        .tolerate(
            "fetch",
            run_git(session.repo_root(), &["fetch", "--prune", remote]),
        )?
        .is_some();
    debug!(remote, fetched, "fetched remote");
    Ok(fetched)
}

/// Fetch the trunk from the session's remote, check it out (creating a
/// tracking branch if needed) and pull it.
///
/// Fetch and pull failures go through the session's failure policy. Merge
/// conflicts produced by the pull are left for the next conflict check.
pub fn sync_trunk(session: &Session) -> Result<TrunkSync> {
    let repo = session.repo_root();
    let remote = session.remote();
    let trunk = session.trunk();
    let policy = session.config().failure_policy;

    output::print_info(&format!(
        "Synchronizing {} with {}...",
        output::format_branch(trunk),
        output::format_remote(remote)
    ));

    let fetched = policy
        .tolerate("fetch", run_git(repo, &["fetch", remote, trunk]))?
        .is_some();

    let switched = switch_to(repo, remote, trunk)?;

    let pulled = policy
        .tolerate("pull", pull_branch(repo, remote, trunk))?
        .is_some();

    if fetched && pulled {
        output::print_success(&format!("{} is up to date.", output::format_branch(trunk)));
    }

    Ok(TrunkSync {
        fetched,
        switched,
        pulled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, FailurePolicy};
    use crate::test_support::{commit_file, create_test_repo_with_remote, git, rev_parse};

    fn session_for(work: &Path, config: Config) -> Session {
        Session::new(work.to_path_buf(), "origin".to_string(), config)
    }

    #[test]
    fn test_sync_fast_forwards_local_trunk() {
        let remote = create_test_repo_with_remote();
        let other = remote.clone_as("other");
        commit_file(&other, "upstream.txt", "new\n", "Upstream change");
        git(&other, &["push", "origin", "main"]);

        let session = session_for(&remote.work, Config::default());
        let sync = sync_trunk(&session).unwrap();

        assert!(sync.fetched);
        assert!(sync.pulled);
        assert_eq!(sync.switched, Switched::Existing);
        assert_eq!(
            rev_parse(&remote.work, "main"),
            rev_parse(&other, "main")
        );
    }

    #[test]
    fn test_sync_returns_to_trunk_from_feature_branch() {
        let remote = create_test_repo_with_remote();
        git(&remote.work, &["checkout", "-b", "topic"]);

        let session = session_for(&remote.work, Config::default());
        sync_trunk(&session).unwrap();

        assert_eq!(session.current_branch().unwrap(), "main");
    }

    #[test]
    fn test_sync_creates_missing_local_trunk() {
        let remote = create_test_repo_with_remote();
        git(&remote.work, &["checkout", "-b", "topic"]);
        git(&remote.work, &["branch", "-D", "main"]);

        let session = session_for(&remote.work, Config::default());
        let sync = sync_trunk(&session).unwrap();

        assert_eq!(sync.switched, Switched::CreatedFromRemote);
        assert_eq!(session.current_branch().unwrap(), "main");
        assert_eq!(
            rev_parse(&remote.work, "main"),
            rev_parse(&remote.work, "origin/main")
        );
    }

    #[test]
    fn test_best_effort_tolerates_unreachable_remote() {
        let remote = create_test_repo_with_remote();
        git(&remote.work, &["remote", "set-url", "origin", "/nonexistent/repo.git"]);

        let session = session_for(&remote.work, Config::default());
        let sync = sync_trunk(&session).unwrap();

        assert!(!sync.fetched);
        assert!(!sync.pulled);
        assert_eq!(session.current_branch().unwrap(), "main");
    }

    #[test]
    fn test_strict_policy_surfaces_fetch_failure() {
        let remote = create_test_repo_with_remote();
        git(&remote.work, &["remote", "set-url", "origin", "/nonexistent/repo.git"]);

        let config = Config {
            failure_policy: FailurePolicy::Strict,
            ..Config::default()
        };
        let session = session_for(&remote.work, config);
        let err = sync_trunk(&session).unwrap_err();

        assert!(matches!(err, PilotError::GitError(_)));
        assert!(err.to_string().contains("git fetch failed"));
    }

    #[test]
    fn test_switch_to_unknown_branch_fails() {
        let remote = create_test_repo_with_remote();
        let err = switch_to(&remote.work, "origin", "does-not-exist").unwrap_err();

        assert!(matches!(err, PilotError::GitError(_)));
        assert!(err.to_string().contains("origin/does-not-exist"));
        assert_eq!(git::current_branch(&remote.work).unwrap(), "main");
    }

    #[test]
    fn test_fetch_remote_sees_branches_pushed_by_others() {
        let remote = create_test_repo_with_remote();
        let other = remote.clone_as("other");
        git(&other, &["checkout", "-b", "bugfix/42"]);
        commit_file(&other, "fix.txt", "fix\n", "Fix 42");
        git(&other, &["push", "origin", "bugfix/42"]);

        let session = session_for(&remote.work, Config::default());
        sync_trunk(&session).unwrap();
        assert!(
            !crate::remote::list_remote_branches(&remote.work, "origin")
                .unwrap()
                .contains(&"bugfix/42".to_string())
        );

        assert!(fetch_remote(&session).unwrap());
        assert!(
            crate::remote::list_remote_branches(&remote.work, "origin")
                .unwrap()
                .contains(&"bugfix/42".to_string())
        );
        assert_eq!(
            switch_to(&remote.work, "origin", "bugfix/42").unwrap(),
            Switched::CreatedFromRemote
        );
    }

    #[test]
    fn test_fetch_remote_prunes_deleted_branches() {
        let remote = create_test_repo_with_remote();
        git(&remote.work, &["push", "origin", "main:stale"]);
        git(&remote.work, &["fetch", "origin"]);
        git(&remote.bare, &["branch", "-D", "stale"]);

        let session = session_for(&remote.work, Config::default());
        fetch_remote(&session).unwrap();

        assert!(
            !crate::remote::list_remote_branches(&remote.work, "origin")
                .unwrap()
                .contains(&"stale".to_string())
        );
    }

    #[test]
    fn test_switch_to_dash_name_is_not_an_option() {
        let remote = create_test_repo_with_remote();
        let head = rev_parse(&remote.work, "HEAD");

        let err = switch_to(&remote.work, "origin", "--detach").unwrap_err();

        assert!(matches!(err, PilotError::GitError(_)));
        assert!(err.to_string().contains("read as an option"));
        assert_eq!(git::current_branch(&remote.work).unwrap(), "main");
        assert_eq!(rev_parse(&remote.work, "HEAD"), head);
    }
}
