//! Collect the staged change set that the model describes.

use tracing::{debug, info};

use crate::commit::filter::{IgnoreRules, filter_with_rules};
use crate::error::CommitError;
use crate::git::GitBackend;

/// Staged files that survived filtering plus their unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedChangeSet {
    pub files: Vec<String>,
    /// Output of `git diff --cached` for `files`, exactly as git printed it.
    pub diff: String,
}

/// List, filter and diff the staged changes.
///
/// Fails with [`CommitError::NoStagedChanges`] when nothing is staged and
/// [`CommitError::AllFilesIgnored`] when every staged file is excluded.
/// Ignore patterns are compiled before git is consulted.
pub async fn collect_staged_changes<G: GitBackend + ?Sized>(
    git: &G,
    ignore_globs: &[String],
) -> Result<StagedChangeSet, CommitError> {
    let rules = IgnoreRules::compile(ignore_globs)?;

    let staged = git
        .staged_files()
        .await
        .map_err(CommitError::StagedFilesFailed)?;
    if staged.is_empty() {
        return Err(CommitError::NoStagedChanges);
    }
    debug!("{} staged files", staged.len());

    let files = filter_with_rules(&staged, &rules, git).await?;
    if files.is_empty() {
        return Err(CommitError::AllFilesIgnored);
    }
    if files.len() < staged.len() {
        info!(
            "Describing {} of {} staged files ({} ignored)",
            files.len(),
            staged.len(),
            staged.len() - files.len()
        );
    }

    // Nothing excluded: an unscoped diff avoids passing every path to git.
    let scope: &[String] = if files.len() == staged.len() { &[] } else { &files };
    let diff = git
        .staged_diff(scope)
        .await
        .map_err(CommitError::DiffReadFailure)?;

    Ok(StagedChangeSet { files, diff })
}
