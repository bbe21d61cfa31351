//! Interactive review of a generated commit message.
//!
//! The loop moves through `Generate -> Present -> AwaitInput` and from there
//! to a commit, a cancellation, a fresh generation, or an edit. Only an
//! accepted message reaches the commit sink, and it does so exactly once.

use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use crate::error::CommitError;
use crate::git::GitBackend;
use crate::llm::{ChatMessage, MessageGenerator};

/// Question shown after each candidate message.
pub const DECISION_PROMPT: &str = "What would you like to do? ([Y]es/[n]o/[r]etry/[e]dit): ";

/// The user's answer to [`DECISION_PROMPT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitDecision {
    Accept,
    Reject,
    Retry,
    Edit,
    Invalid,
}

impl CommitDecision {
    /// Map one input line, case-insensitively. A blank line accepts.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => CommitDecision::Accept,
            "n" | "no" => CommitDecision::Reject,
            "r" | "retry" => CommitDecision::Retry,
            "e" | "edit" => CommitDecision::Edit,
            _ => CommitDecision::Invalid,
        }
    }
}

/// How the loop finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    Committed { message: String },
    Cancelled,
}

/// Terminal side of the loop: show messages and read decisions.
pub trait Prompter {
    /// Show the current candidate message.
    fn present(&mut self, message: &str) -> io::Result<()>;

    /// Ask for a decision. `Ok(None)` means input is closed.
    fn read_decision(&mut self) -> io::Result<Option<String>>;

    /// Show a status line.
    fn notify(&mut self, text: &str) -> io::Result<()>;
}

/// External text editing seeded with the current message.
pub trait MessageEditor {
    /// Returns the edited text, or `None` when the user abandoned the edit.
    fn edit(&mut self, current: &str) -> io::Result<Option<String>>;
}

/// [`Prompter`] over any line reader and writer.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn present(&mut self, message: &str) -> io::Result<()> {
        let rule = "─".repeat(60);
        writeln!(self.output, "\nCommit message:")?;
        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "{message}")?;
        writeln!(self.output, "{rule}")?;
        self.output.flush()
    }

    fn read_decision(&mut self) -> io::Result<Option<String>> {
        write!(self.output, "\n{DECISION_PROMPT}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn notify(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")?;
        self.output.flush()
    }
}

/// [`MessageEditor`] that opens `$VISUAL` / `$EDITOR` on a temporary file.
#[derive(Debug, Default)]
pub struct ExternalEditor;

impl MessageEditor for ExternalEditor {
    fn edit(&mut self, current: &str) -> io::Result<Option<String>> {
        dialoguer::Editor::new()
            .extension(".txt")
            .edit(current)
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

#[derive(Debug)]
enum LoopState {
    Generate,
    Present,
    AwaitInput,
    Edit,
    Done(LoopOutcome),
}

/// Drives generation and review until the user commits or cancels.
pub struct ConfirmationLoop<'a> {
    generator: &'a dyn MessageGenerator,
    sink: &'a dyn GitBackend,
    prompt: &'a [ChatMessage],
    prompter: &'a mut dyn Prompter,
    editor: &'a mut dyn MessageEditor,
}

impl<'a> ConfirmationLoop<'a> {
    pub fn new(
        generator: &'a dyn MessageGenerator,
        sink: &'a dyn GitBackend,
        prompt: &'a [ChatMessage],
        prompter: &'a mut dyn Prompter,
        editor: &'a mut dyn MessageEditor,
    ) -> Self {
        Self {
            generator,
            sink,
            prompt,
            prompter,
            editor,
        }
    }

    /// Run until [`LoopOutcome`].
    ///
    /// A generation failure aborts the loop; there is no automatic retry at
    /// this level, only the user's `retry` decision after a success.
    pub async fn run(self) -> Result<LoopOutcome, CommitError> {
        let ConfirmationLoop {
            generator,
            sink,
            prompt,
            prompter,
            editor,
        } = self;

        let mut state = LoopState::Generate;
        let mut candidate = String::new();

        loop {
            state = match state {
                LoopState::Generate => {
                    notify(prompter, "Generating commit message...")?;
                    candidate = generator.generate(prompt).await?;
                    debug!("Generated candidate of {} chars", candidate.len());
                    LoopState::Present
                }
                LoopState::Present => {
                    prompter
                        .present(&candidate)
                        .map_err(CommitError::Interaction)?;
                    LoopState::AwaitInput
                }
                LoopState::AwaitInput => {
                    let decision = match prompter
                        .read_decision()
                        .map_err(CommitError::Interaction)?
                    {
                        Some(line) => CommitDecision::parse(&line),
                        None => {
                            debug!("Input closed; treating as reject");
                            CommitDecision::Reject
                        }
                    };

                    match decision {
                        CommitDecision::Accept => {
                            sink.commit(&candidate)
                                .await
                                .map_err(CommitError::CommitFailure)?;
                            LoopState::Done(LoopOutcome::Committed {
                                message: std::mem::take(&mut candidate),
                            })
                        }
                        CommitDecision::Reject => LoopState::Done(LoopOutcome::Cancelled),
                        CommitDecision::Retry => {
                            candidate.clear();
                            LoopState::Generate
                        }
                        CommitDecision::Edit => LoopState::Edit,
                        CommitDecision::Invalid => {
                            notify(prompter, "Invalid option, please try again")?;
                            LoopState::AwaitInput
                        }
                    }
                }
                LoopState::Edit => {
                    match editor.edit(&candidate) {
                        Ok(Some(edited)) => {
                            let edited = edited.trim();
                            if edited.is_empty() {
                                notify(
                                    prompter,
                                    "Edited message is empty; keeping the previous message",
                                )?;
                            } else {
                                candidate = edited.to_string();
                            }
                        }
                        Ok(None) => {
                            notify(prompter, "Edit abandoned; keeping the previous message")?;
                        }
                        Err(e) => {
                            warn!("Editor failed: {}", e);
                            notify(prompter, &format!("Error editing message: {}", e))?;
                        }
                    }
                    LoopState::Present
                }
                LoopState::Done(outcome) => return Ok(outcome),
            };
        }
    }
}

fn notify(prompter: &mut dyn Prompter, text: &str) -> Result<(), CommitError> {
    prompter.notify(text).map_err(CommitError::Interaction)
}
