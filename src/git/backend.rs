//! Narrow capability interface over the repository.

use async_trait::async_trait;

use crate::error::GitError;

/// The repository operations the commit workflow depends on.
///
/// This abstraction allows substituting a fake repository in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitBackend: Send + Sync {
    /// Paths of all staged files, in the order git reports them.
    async fn staged_files(&self) -> Result<Vec<String>, GitError>;

    /// Unified diff of the staged changes, restricted to `paths` when non-empty.
    async fn staged_diff(&self, paths: &[String]) -> Result<String, GitError>;

    /// Whether git's ignore rules match `path`.
    async fn is_ignored(&self, path: &str) -> Result<bool, GitError>;

    /// Commit the staged changes with `message`.
    async fn commit(&self, message: &str) -> Result<(), GitError>;
}
