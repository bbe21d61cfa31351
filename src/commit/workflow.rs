//! End-to-end commit workflow: staged changes in, one commit (or none) out.

use tracing::info;

use crate::commit::confirm::{ConfirmationLoop, LoopOutcome, MessageEditor, Prompter};
use crate::commit::prompt::{PromptBuilder, PromptVariant};
use crate::commit::staged::collect_staged_changes;
use crate::error::CommitError;
use crate::git::GitBackend;
use crate::llm::MessageGenerator;

/// Interactive collaborators for [`run_workflow`].
pub struct Interaction<'a> {
    pub prompter: &'a mut dyn Prompter,
    pub editor: &'a mut dyn MessageEditor,
}

/// Collect and filter staged changes, build the prompt, and run the
/// confirmation loop.
///
/// No completion request is made when there is nothing to describe.
pub async fn run_workflow(
    git: &dyn GitBackend,
    generator: &dyn MessageGenerator,
    prompts: &PromptBuilder,
    ignore_globs: &[String],
    variant: PromptVariant,
    interaction: Interaction<'_>,
) -> Result<LoopOutcome, CommitError> {
    let changes = collect_staged_changes(git, ignore_globs).await?;
    info!(
        "Generating {} commit message for {} files",
        variant,
        changes.files.len()
    );

    let messages = prompts.messages(&changes.diff, variant);

    ConfirmationLoop::new(
        generator,
        git,
        &messages,
        interaction.prompter,
        interaction.editor,
    )
    .run()
    .await
}
