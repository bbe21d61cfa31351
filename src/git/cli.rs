//! Git backend that shells out to the system `git` binary.
//!
//! Every command runs with the work-tree root as its working directory so
//! paths reported by `git diff --name-only` and checked by `git check-ignore`
//! agree, whichever subdirectory the user started from.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use git2::Repository;
use tokio::process::Command;
use tracing::debug;

use crate::error::GitError;

use super::backend::GitBackend;

/// [`GitBackend`] backed by `git` subprocesses.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    /// Locate the repository containing `path` and target its work tree.
    ///
    /// Fails if `git` is not installed, `path` is not inside a repository,
    /// or the repository is bare.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        if which::which("git").is_err() {
            return Err(GitError::NotInstalled);
        }

        let repo = Repository::discover(path).map_err(|source| GitError::NotARepository {
            path: path.to_path_buf(),
            source,
        })?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| GitError::BareRepository(repo.path().to_path_buf()))?
            .to_path_buf();

        debug!("Using repository work tree at {}", workdir.display());
        Ok(Self { workdir })
    }

    /// Root of the work tree every command runs in.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    async fn output(&self, args: &[&str]) -> Result<Output, GitError> {
        Command::new("git")
            .args(["-c", "core.quotepath=off"])
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(GitError::SpawnFailed)
    }

    /// Run a git command and return its stdout, failing on non-zero exit.
    async fn run_git(&self, args: &[&str], command: &str) -> Result<String, GitError> {
        let output = self.output(args).await?;

        if !output.status.success() {
            return Err(command_failed(command, &output));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn command_failed(command: &str, output: &Output) -> GitError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    // `git commit` reports "nothing to commit" on stdout.
    let stderr = if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    };

    GitError::CommandFailed {
        command: command.to_string(),
        code: output.status.code(),
        stderr,
    }
}

/// Upper bound on pathspec bytes passed to a single `git diff`. Keeps argv
/// well under ARG_MAX on every supported platform.
const MAX_PATHSPEC_BYTES: usize = 64 * 1024;

/// Split `paths` into consecutive runs whose total length stays within
/// `max_bytes`. A single path longer than the budget gets a run of its own.
pub(crate) fn pathspec_batches(paths: &[String], max_bytes: usize) -> Vec<&[String]> {
    let mut batches = Vec::new();
    let mut start = 0;
    let mut used = 0;

    for (i, path) in paths.iter().enumerate() {
        let len = path.len() + 1;
        if i > start && used + len > max_bytes {
            batches.push(&paths[start..i]);
            start = i;
            used = 0;
        }
        used += len;
    }
    if start < paths.len() {
        batches.push(&paths[start..]);
    }

    batches
}

/// Split `git diff --name-only` output into paths, dropping blank lines.
pub(crate) fn parse_name_only(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl GitBackend for GitCli {
    async fn staged_files(&self) -> Result<Vec<String>, GitError> {
        let stdout = self
            .run_git(&["diff", "--cached", "--name-only"], "diff --cached --name-only")
            .await?;
        Ok(parse_name_only(&stdout))
    }

    async fn staged_diff(&self, paths: &[String]) -> Result<String, GitError> {
        if paths.is_empty() {
            return self.run_git(&["diff", "--cached"], "diff --cached").await;
        }

        // Per-file diffs are independent, so batches concatenate to the same
        // output as one invocation over every path.
        let mut diff = String::new();
        for batch in pathspec_batches(paths, MAX_PATHSPEC_BYTES) {
            let mut args = vec!["--literal-pathspecs", "diff", "--cached", "--"];
            args.extend(batch.iter().map(String::as_str));
            diff.push_str(&self.run_git(&args, "diff --cached").await?);
        }
        Ok(diff)
    }

    async fn is_ignored(&self, path: &str) -> Result<bool, GitError> {
        let output = self.output(&["check-ignore", "-q", "--", path]).await?;

        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(command_failed("check-ignore", &output)),
        }
    }

    async fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run_git(&["commit", "-m", message], "commit").await?;
        Ok(())
    }
}
