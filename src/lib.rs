//! gptcomet - generate Git commit messages for staged changes with an LLM.
//!
//! # Overview
//!
//! gptcomet reads the staged diff, drops files matched by ignore globs or
//! `.gitignore`, asks a chat completion endpoint for a commit message, and
//! lets the user accept, retry, edit or reject it before committing.

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;

// Re-export commonly used types
pub use commit::{LoopOutcome, PromptBuilder, PromptVariant, run_workflow};
pub use config::{ClientConfig, Config, ProviderKind};
pub use error::{CommitError, CompletionError, ConfigError, GitError};
pub use git::{GitBackend, GitCli};
pub use llm::{ChatMessage, CompletionClient, MessageGenerator};
