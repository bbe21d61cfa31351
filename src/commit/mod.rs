//! AI-generated commit messages for the staged changes.

pub mod confirm;
pub mod filter;
pub mod prompt;
pub mod staged;
pub mod workflow;

pub use confirm::{
    CommitDecision, ConfirmationLoop, ExternalEditor, LoopOutcome, MessageEditor, Prompter,
    TerminalPrompter,
};
pub use filter::{IgnoreRules, filter_staged_files};
pub use prompt::{DIFF_MARKER, PromptBuilder, PromptVariant};
pub use staged::{StagedChangeSet, collect_staged_changes};
pub use workflow::{Interaction, run_workflow};
