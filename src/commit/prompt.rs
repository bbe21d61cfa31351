//! Prompt construction for AI-generated commit messages.
//!
//! The builder is pure: the same templates, language, diff and variant always
//! produce byte-identical messages.

use std::fmt;

use crate::llm::ChatMessage;

/// Marker line placed before the diff in the user message.
pub const DIFF_MARKER: &str = "Staged changes (git diff --cached):";

/// Which system template to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptVariant {
    /// Summary line plus an optional short body.
    #[default]
    Brief,
    /// Summary line plus a bulleted body describing what changed and why.
    Rich,
}

impl fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptVariant::Brief => f.write_str("brief"),
            PromptVariant::Rich => f.write_str("rich"),
        }
    }
}

const BRIEF_TEMPLATE: &str = r#"You are an expert software engineer writing Git commit messages.

Write a commit message for the staged changes the user provides.

## Format Rules (STRICT)
- Start with a concise summary line of at most 50 characters
- Follow the summary with one blank line
- Add a short body only if the change needs explanation
- Use the imperative mood in the summary ("add", "fix", "remove")
- Do NOT end the summary line with a period
- Wrap body lines at 72 characters
- Use the body to explain what and why, not how

## Output
Respond with ONLY the commit message. No markdown fences, no explanations."#;

const RICH_TEMPLATE: &str = r#"You are an expert software engineer writing Git commit messages.

Write a detailed commit message for the staged changes the user provides.

## Format Rules (STRICT)
- Start with a concise summary line of at most 50 characters
- Follow the summary with one blank line
- Then write a body as a bulleted list ("- ") of the notable changes
- Each bullet states what changed and, where it is not obvious, why
- Use the imperative mood in the summary ("add", "fix", "remove")
- Do NOT end the summary line with a period
- Wrap body lines at 72 characters

## Output
Respond with ONLY the commit message. No markdown fences, no explanations."#;

/// Builds the system + user message pair sent to the model.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    brief: String,
    rich: String,
    language: Option<String>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            brief: BRIEF_TEMPLATE.to_string(),
            rich: RICH_TEMPLATE.to_string(),
            language: None,
        }
    }
}

impl PromptBuilder {
    /// Replace the system template for `variant`.
    pub fn with_template(mut self, variant: PromptVariant, template: impl Into<String>) -> Self {
        let template = template.into();
        match variant {
            PromptVariant::Brief => self.brief = template,
            PromptVariant::Rich => self.rich = template,
        }
        self
    }

    /// Request output in `language`. English, or blank, adds no instruction.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into().trim().to_string();
        self.language = match language.to_ascii_lowercase().as_str() {
            "" | "en" | "english" => None,
            _ => Some(language),
        };
        self
    }

    /// Build `(system, user)` messages for `diff`.
    ///
    /// The diff is embedded verbatim after [`DIFF_MARKER`].
    pub fn build(&self, diff: &str, variant: PromptVariant) -> (ChatMessage, ChatMessage) {
        let template = match variant {
            PromptVariant::Brief => &self.brief,
            PromptVariant::Rich => &self.rich,
        };

        let system = match &self.language {
            Some(lang) => format!("{template}\n\nWrite the commit message in {lang}."),
            None => template.clone(),
        };

        let user = format!("{DIFF_MARKER}\n\n{diff}");

        (ChatMessage::system(system), ChatMessage::user(user))
    }

    /// [`build`](Self::build) as an ordered message list.
    pub fn messages(&self, diff: &str, variant: PromptVariant) -> Vec<ChatMessage> {
        let (system, user) = self.build(diff, variant);
        vec![system, user]
    }
}
