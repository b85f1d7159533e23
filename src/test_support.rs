use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A bare "remote" repository plus a working clone wired to it as `origin`.
pub(crate) struct TestRemote {
    _root: TempDir,
    pub(crate) bare: PathBuf,
    pub(crate) work: PathBuf,
}

impl TestRemote {
    /// Clone the bare remote into a second working copy, used to simulate
    /// another developer pushing commits.
    pub(crate) fn clone_as(&self, name: &str) -> PathBuf {
        let dir = self.bare.parent().unwrap().join(name);
        git(
            self.bare.parent().unwrap(),
            &["clone", &self.bare.to_string_lossy(), name],
        );
        configure_user(&dir);
        dir
    }
}

pub(crate) fn create_test_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    init_repo(temp_dir.path());
    temp_dir
}

pub(crate) fn create_test_repo_with_remote() -> TestRemote {
    let root = TempDir::new().unwrap();
    let bare = root.path().join("remote.git");
    let work = root.path().join("work");
    std::fs::create_dir_all(&bare).unwrap();
    std::fs::create_dir_all(&work).unwrap();

    git(&bare, &["init", "--bare"]);
    git(&bare, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    init_repo(&work);
    git(&work, &["remote", "add", "origin", &bare.to_string_lossy()]);
    git(&work, &["push", "-u", "origin", "main"]);

    TestRemote {
        _root: root,
        bare,
        work,
    }
}

fn init_repo(path: &Path) {
    git(path, &["init"]);
    // Deterministic default branch name across environments.
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    configure_user(path);

    std::fs::write(path.join("README.md"), "# Test\n").unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);
}

fn configure_user(path: &Path) {
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "commit.gpgsign", "false"]);
    git(path, &["config", "pull.rebase", "false"]);
}

/// Commit a file with the given content on the current branch.
pub(crate) fn commit_file(repo: &Path, file: &str, content: &str, message: &str) {
    std::fs::write(repo.join(file), content).unwrap();
    git(repo, &["add", file]);
    git(repo, &["commit", "-m", message]);
}

/// Number of commits reachable from `rev`.
pub(crate) fn commit_count(repo: &Path, rev: &str) -> usize {
    git_stdout(repo, &["rev-list", "--count", rev]).parse().unwrap()
}

/// Resolve a revision to its SHA.
pub(crate) fn rev_parse(repo: &Path, rev: &str) -> String {
    git_stdout(repo, &["rev-parse", rev])
}

/// Leave `file` with unresolved conflict markers by merging two divergent branches.
pub(crate) fn create_conflict(repo: &Path, file: &str) {
    commit_file(repo, file, "base\n", "base");
    git(repo, &["checkout", "-b", "conflict-side"]);
    commit_file(repo, file, "side\n", "side change");
    git(repo, &["checkout", "main"]);
    commit_file(repo, file, "main\n", "main change");

    let output = Command::new("git")
        .current_dir(repo)
        .args(["merge", "conflict-side"])
        .output()
        .unwrap();
    assert!(!output.status.success(), "merge was expected to conflict");
}

pub(crate) fn git_stdout(repo_dir: &Path, args: &[&str]) -> String {
    let output = git(repo_dir, args);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub(crate) fn git(repo_dir: &Path, args: &[&str]) -> std::process::Output {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }

    output
}
