//! Decide which staged files are described to the model.

use std::path::Path;

use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::error::CommitError;
use crate::git::GitBackend;

/// `*` and `?` never cross a path separator, as in shell globbing.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled `file_ignore` patterns from configuration.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<Pattern>,
}

impl IgnoreRules {
    /// Compile every pattern, failing on the first malformed one.
    pub fn compile<S: AsRef<str>>(globs: &[S]) -> Result<Self, CommitError> {
        let patterns = globs
            .iter()
            .map(|g| {
                let pattern = g.as_ref();
                Pattern::new(pattern).map_err(|source| CommitError::InvalidIgnorePattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// The first pattern matching `path`, if any.
    ///
    /// Patterns without a `/` are also tried against the file name, so
    /// `*.lock` matches `crates/core/Cargo.lock`.
    pub fn matching_pattern(&self, path: &str) -> Option<&str> {
        let file_name = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path);

        self.patterns
            .iter()
            .find(|p| {
                p.matches_with(path, MATCH_OPTIONS)
                    || (!p.as_str().contains('/') && p.matches_with(file_name, MATCH_OPTIONS))
            })
            .map(Pattern::as_str)
    }
}

/// Drop files excluded by configured globs or by git's ignore rules.
///
/// Patterns are compiled before any file is probed, so a malformed pattern
/// fails the call without running git. Order of `files` is preserved.
pub async fn filter_staged_files<G: GitBackend + ?Sized>(
    files: &[String],
    ignore_globs: &[String],
    git: &G,
) -> Result<Vec<String>, CommitError> {
    let rules = IgnoreRules::compile(ignore_globs)?;
    filter_with_rules(files, &rules, git).await
}

/// [`filter_staged_files`] with already-compiled rules.
pub async fn filter_with_rules<G: GitBackend + ?Sized>(
    files: &[String],
    rules: &IgnoreRules,
    git: &G,
) -> Result<Vec<String>, CommitError> {
    let mut kept = Vec::with_capacity(files.len());

    for file in files {
        if let Some(pattern) = rules.matching_pattern(file) {
            debug!("Ignoring {} (matches file_ignore pattern '{}')", file, pattern);
            continue;
        }

        let ignored = git
            .is_ignored(file)
            .await
            .map_err(|source| CommitError::IgnoreCheckFailed {
                path: file.clone(),
                source,
            })?;
        if ignored {
            debug!("Ignoring {} (matched by git ignore rules)", file);
            continue;
        }

        kept.push(file.clone());
    }

    Ok(kept)
}
