//! Error types for gptcomet modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git subprocess operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git executable not found in PATH. Install git and try again")]
    NotInstalled,

    #[error("Failed to spawn git process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("{} is not inside a git repository: {source}", path.display())]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Repository at {} has no working tree", .0.display())]
    BareRepository(PathBuf),

    #[error("git {command} exited with {}: {stderr}",
             code.map_or("unknown status".to_string(), |c| format!("code {c}")))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Errors from the chat completion client.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Failed to parse completion response: {0}")]
    InvalidResponse(String),

    #[error("No response from model (completion contained no choices)")]
    EmptyChoices,

    #[error("Completion failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<CompletionError>,
    },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Invalid extra header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
}

impl CompletionError {
    /// Whether a fresh attempt may succeed where this one failed.
    ///
    /// Transport and HTTP-level failures are retried. An empty completion is
    /// a definitive answer from the model and is never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::Transport(_)
                | CompletionError::HttpStatus { .. }
                | CompletionError::InvalidResponse(_)
        )
    }
}

/// Errors from commit message generation and the commit workflow.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("No staged changes found. Stage files with `git add` first")]
    NoStagedChanges,

    #[error("All staged files are ignored; nothing to describe")]
    AllFilesIgnored,

    #[error("Invalid file_ignore pattern '{pattern}': {source}")]
    InvalidIgnorePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to list staged files: {0}")]
    StagedFilesFailed(#[source] GitError),

    #[error("Failed to check whether '{path}' is ignored: {source}")]
    IgnoreCheckFailed {
        path: String,
        #[source]
        source: GitError,
    },

    #[error("Failed to read staged diff: {0}")]
    DiffReadFailure(#[source] GitError),

    #[error("Failed to create commit: {0}")]
    CommitFailure(#[source] GitError),

    #[error("Failed to generate commit message: {0}")]
    Generation(#[source] CompletionError),

    #[error("Failed to read user input: {0}")]
    Interaction(#[source] std::io::Error),
}

impl From<CompletionError> for CommitError {
    fn from(err: CompletionError) -> Self {
        CommitError::Generation(err)
    }
}

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the user configuration directory")]
    NoConfigDir,

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown provider '{0}'. Supported providers: openai, groq")]
    UnknownProvider(String),

    #[error("Invalid settings for provider '{provider}': {source}")]
    InvalidProviderSection {
        provider: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(
        "No API key configured for provider '{provider}'. Set api_key in the [{provider}] section, GPTCOMET_API_KEY, or {env_var}"
    )]
    MissingApiKey { provider: String, env_var: String },

    #[error("Invalid extra_headers: {0}")]
    InvalidExtraHeaders(String),
}
