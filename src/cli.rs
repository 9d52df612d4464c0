//! Command-line interface and the interactive cleanup run

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::client::MailboxClient;
use crate::config::{Config, PurgeConfig};
use crate::enumerator;
use crate::error::{PurgeError, Result};
use crate::executor::{self, DeletionExecutor, DeletionOutcome};
use crate::models::{DeleteMode, Label, RunConfig, RunOutcome};
use crate::progress::ProgressReporter;
use crate::prompt::Prompter;

pub const LABEL_PROMPT: &str = "Enter id of label to delete:";
pub const MAX_COUNT_PROMPT: &str = "Enter max number of emails to delete:";

#[derive(Parser, Debug)]
#[command(name = "gmail-purge")]
#[command(version)]
#[command(about = "Trash or permanently delete every Gmail message carrying a label", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to OAuth2 credentials file (overrides auth.credentials)
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Path to token cache file (overrides auth.token_cache)
    #[arg(long)]
    pub token_cache: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate with Gmail API and cache the token
    Auth {
        /// Discard the cached token and re-run the browser flow
        #[arg(long)]
        force: bool,

        /// Request full mailbox access (needed for permanent deletion)
        #[arg(long)]
        permanent: bool,
    },

    /// List labels with their ids
    Labels,

    /// Pick a label, preview its messages, then trash or delete them
    Clean {
        /// Permanently batch-delete instead of moving to trash
        #[arg(long)]
        permanent: bool,
    },

    /// Generate example configuration file
    InitConfig {
        /// Path to create config file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn credentials_path(&self, config: &Config) -> PathBuf {
        self.credentials
            .clone()
            .unwrap_or_else(|| config.auth.credentials.clone())
    }

    pub fn token_cache_path(&self, config: &Config) -> PathBuf {
        self.token_cache
            .clone()
            .unwrap_or_else(|| config.auth.token_cache.clone())
    }
}

/// Deletion mode for a run: `--permanent` wins, then the configured default
pub fn resolve_mode(permanent: bool, config: &Config) -> DeleteMode {
    if permanent {
        DeleteMode::BatchDelete
    } else {
        config.purge.default_mode
    }
}

/// Settings of one `clean` run that do not come from prompts
#[derive(Debug, Clone)]
pub struct CleanSettings {
    pub mode: DeleteMode,
    pub preview_count: usize,
    pub batch_size: usize,
    pub token_cache: PathBuf,
}

impl CleanSettings {
    /// Settings with the default `[purge]` values
    pub fn new(mode: DeleteMode, token_cache: impl Into<PathBuf>) -> Self {
        let purge = PurgeConfig::default();
        Self {
            mode,
            preview_count: purge.preview_count,
            batch_size: purge.batch_size,
            token_cache: token_cache.into(),
        }
    }

    pub fn from_config(mode: DeleteMode, config: &Config, token_cache: PathBuf) -> Self {
        Self {
            mode,
            preview_count: config.purge.preview_count,
            batch_size: config.purge.batch_size,
            token_cache,
        }
    }
}

/// Message printed when the service rejects a deletion call
pub fn remediation_hint(token_cache: &Path) -> String {
    format!(
        "Failed to delete - try deleting {} (or run `gmail-purge auth --force`) and try again",
        token_cache.display()
    )
}

pub fn print_labels<W: Write>(out: &mut W, labels: &[Label]) -> Result<()> {
    writeln!(out, "Labels:")?;
    for label in labels {
        writeln!(out, "id: {}", label.id)?;
        writeln!(out, "    name: {}", label.name)?;
    }
    Ok(())
}

/// The interactive cleanup run
///
/// Lists labels, asks for a label id and a cap, enumerates and previews the
/// matching messages, then hands over to [`DeletionExecutor`]. Errors before
/// the deletion phase propagate; deletion failures print the remediation hint
/// and come back as [`RunOutcome::Failed`].
pub async fn run_clean<C, P, W>(
    client: &C,
    prompter: &P,
    reporter: &ProgressReporter,
    settings: &CleanSettings,
    out: &mut W,
) -> Result<RunOutcome>
where
    C: MailboxClient + ?Sized,
    P: Prompter + ?Sized,
    W: Write,
{
    let labels = enumerator::list_labels(client).await?;
    if labels.is_empty() {
        writeln!(out, "No labels found.")?;
        return Ok(RunOutcome::NoLabels);
    }
    print_labels(out, &labels)?;
    out.flush()?;

    let run = match ask_run_config(prompter, reporter, settings.mode) {
        Ok(run) => run,
        Err(PurgeError::OperationCancelled(_)) => {
            writeln!(out, "Aborted.")?;
            return Ok(RunOutcome::Aborted);
        }
        Err(e) => return Err(e),
    };
    if !labels.iter().any(|label| label.id == run.label_id) {
        warn!("Label id {:?} is not in the listed labels", run.label_id);
    }
    info!(
        "Run: label={} max={} mode={}",
        run.label_id, run.max_messages, run.mode
    );

    writeln!(out, "Searching for emails...")?;
    let spinner = reporter.add_spinner("Searching for emails...");
    let messages =
        enumerator::list_messages(client, &run.label_id, run.max_messages, &spinner).await;
    spinner.finish_and_clear();
    let messages = messages?;
    writeln!(out, "Found {} messages", messages.len())?;

    let snippets = executor::preview(client, &messages, settings.preview_count).await?;
    executor::write_preview(out, &snippets)?;
    writeln!(out)?;
    out.flush()?;

    let outcome = DeletionExecutor::new(client, prompter, reporter)
        .with_batch_size(settings.batch_size)
        .confirm_and_delete(&messages, run.max_messages, run.mode)
        .await?;

    match outcome {
        DeletionOutcome::Aborted => {
            writeln!(out, "Aborted.")?;
            Ok(RunOutcome::Aborted)
        }
        DeletionOutcome::Completed { deleted } => {
            writeln!(out, "Deleted {}/{}", deleted, deleted)?;
            writeln!(out, "\nFinished")?;
            Ok(RunOutcome::Finished { deleted })
        }
        DeletionOutcome::Failed { deleted, error } => {
            let total = executor::num_to_delete(run.max_messages, messages.len());
            writeln!(out, "Deleted {}/{}", deleted, total)?;
            writeln!(out, "{}", remediation_hint(&settings.token_cache))?;
            writeln!(out, "Cause: {}", error)?;
            Ok(RunOutcome::Failed { deleted, error })
        }
    }
}

fn ask_run_config<P>(prompter: &P, reporter: &ProgressReporter, mode: DeleteMode) -> Result<RunConfig>
where
    P: Prompter + ?Sized,
{
    reporter.suspend(|| {
        let label_id = prompter.ask_text(LABEL_PROMPT)?;
        let max_messages = prompter.ask_count(MAX_COUNT_PROMPT)?;
        Ok(RunConfig {
            label_id,
            max_messages,
            mode,
        })
    })
}
