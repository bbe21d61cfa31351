//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use gptcomet::commit::{MessageEditor, Prompter};
use gptcomet::{ChatMessage, CompletionError, GitBackend, GitError, MessageGenerator};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a local identity configured,
    /// so `git commit` works without a global config.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
            config.set_bool("commit.gpgsign", false).unwrap();
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the work tree, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
    }

    /// Add a file to the index.
    pub fn stage(&self, relative: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(relative)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write and stage in one step.
    pub fn write_and_stage(&self, relative: &str, content: &str) {
        self.write(relative, content);
        self.stage(relative);
    }

    /// Commit the current index. Returns the commit OID.
    pub fn commit_index(&self, message: &str) -> Oid {
        let sig =
            Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Message of the HEAD commit, if there is one.
    pub fn head_message(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        let commit = head.peel_to_commit().ok()?;
        commit.message().map(|m| m.trim_end().to_string())
    }

    /// Number of commits reachable from HEAD.
    pub fn commit_count(&self) -> usize {
        let Ok(mut walk) = self.repo.revwalk() else {
            return 0;
        };
        if walk.push_head().is_err() {
            return 0;
        }
        walk.count()
    }
}

/// Prompter fed from a fixed list of answers.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub answers: VecDeque<String>,
    pub presented: Vec<String>,
    pub notices: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn present(&mut self, message: &str) -> io::Result<()> {
        self.presented.push(message.to_string());
        Ok(())
    }

    fn read_decision(&mut self) -> io::Result<Option<String>> {
        Ok(self.answers.pop_front())
    }

    fn notify(&mut self, text: &str) -> io::Result<()> {
        self.notices.push(text.to_string());
        Ok(())
    }
}

/// Editor that replaces the message with fixed texts, in order.
#[derive(Default)]
pub struct ScriptedEditor {
    pub replacements: VecDeque<Option<String>>,
    pub calls: u32,
}

impl ScriptedEditor {
    pub fn new(replacements: &[Option<&str>]) -> Self {
        Self {
            replacements: replacements
                .iter()
                .map(|r| r.map(str::to_string))
                .collect(),
            calls: 0,
        }
    }
}

impl MessageEditor for ScriptedEditor {
    fn edit(&mut self, _current: &str) -> io::Result<Option<String>> {
        self.calls += 1;
        Ok(self.replacements.pop_front().flatten())
    }
}

/// Generator returning canned replies and recording the prompts it saw.
pub struct FakeGenerator {
    replies: Vec<String>,
    calls: AtomicU32,
    pub prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeGenerator {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageGenerator for FakeGenerator {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        self.prompts.lock().unwrap().push(messages.to_vec());
        match self.replies.get(n).or(self.replies.last()) {
            Some(reply) => Ok(reply.clone()),
            None => Err(CompletionError::EmptyChoices),
        }
    }
}

/// In-memory git backend with a fixed staged set.
#[derive(Default)]
pub struct FakeGit {
    pub staged: Vec<String>,
    pub ignored: Vec<String>,
    pub diff: String,
    pub diff_requests: Mutex<Vec<Vec<String>>>,
    pub commits: Mutex<Vec<String>>,
}

impl FakeGit {
    pub fn new(staged: &[&str], diff: &str) -> Self {
        Self {
            staged: staged.iter().map(|s| s.to_string()).collect(),
            diff: diff.to_string(),
            ..Default::default()
        }
    }

    pub fn with_ignored(mut self, ignored: &[&str]) -> Self {
        self.ignored = ignored.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn commits(&self) -> Vec<String> {
        self.commits.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitBackend for FakeGit {
    async fn staged_files(&self) -> Result<Vec<String>, GitError> {
        Ok(self.staged.clone())
    }

    async fn staged_diff(&self, paths: &[String]) -> Result<String, GitError> {
        self.diff_requests.lock().unwrap().push(paths.to_vec());
        Ok(self.diff.clone())
    }

    async fn is_ignored(&self, path: &str) -> Result<bool, GitError> {
        Ok(self.ignored.iter().any(|p| p == path))
    }

    async fn commit(&self, message: &str) -> Result<(), GitError> {
        self.commits.lock().unwrap().push(message.to_string());
        Ok(())
    }
}
