//! gptcomet - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gptcomet::commit::{ExternalEditor, Interaction, LoopOutcome, PromptVariant, TerminalPrompter};
use gptcomet::{CompletionClient, Config, GitCli, run_workflow};

/// Generate commit messages for staged changes using an LLM.
#[derive(Parser, Debug)]
#[command(name = "gptcomet")]
#[command(about = "Generate commit messages for staged changes using an LLM")]
#[command(version)]
struct Cli {
    /// Log requests, responses and workflow steps
    #[arg(short, long, global = true)]
    debug: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a message for the staged changes and commit it
    Commit {
        /// Repository path (defaults to the current directory)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Ask for a detailed, bulleted message body
        #[arg(short, long)]
        rich: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let Command::Commit { path, rich } = cli.command;

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(cli.debug || config.debug);

    let git = GitCli::discover(&path).context("gptcomet must run inside a git repository")?;

    let client_config = config
        .client_config(cli.debug)
        .context("Invalid provider configuration")?;
    let client = CompletionClient::new(client_config).context("Failed to build HTTP client")?;

    let variant = if rich {
        PromptVariant::Rich
    } else {
        PromptVariant::Brief
    };
    let prompts = config.prompt_builder();

    let mut prompter = TerminalPrompter::stdio();
    let mut editor = ExternalEditor;
    let interaction = Interaction {
        prompter: &mut prompter,
        editor: &mut editor,
    };

    let outcome = run_workflow(
        &git,
        &client,
        &prompts,
        &config.file_ignore,
        variant,
        interaction,
    )
    .await;

    match outcome.context("Failed to create commit")? {
        LoopOutcome::Committed { .. } => println!("Successfully created commit"),
        LoopOutcome::Cancelled => println!("Operation cancelled"),
    }

    Ok(())
}

/// Send logs to stderr; `RUST_LOG` takes precedence over the debug switch.
fn init_tracing(debug: bool) {
    let default = if debug { "warn,gptcomet=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
