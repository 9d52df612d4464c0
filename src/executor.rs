//! Snippet preview and the two deletion strategies

use std::io::{self, Write};

use tracing::{debug, error, info};

use crate::client::MailboxClient;
use crate::error::{PurgeError, Result};
use crate::models::{DeleteMode, MessageRef};
use crate::progress::ProgressReporter;

/// Most ids Gmail accepts in one `messages.batchDelete` call
pub const BATCH_DELETE_LIMIT: usize = 100;

/// Number of messages a run acts on: the cap, or fewer if fewer were found
pub fn num_to_delete(cap: usize, available: usize) -> usize {
    cap.min(available)
}

/// Split message ids into consecutive chunks of at most `batch_size`
///
/// `batch_size` is clamped to `1..=BATCH_DELETE_LIMIT`. Only the last chunk
/// can be short.
pub fn chunk_ids(messages: &[MessageRef], batch_size: usize) -> Vec<Vec<String>> {
    let size = batch_size.clamp(1, BATCH_DELETE_LIMIT);
    messages
        .chunks(size)
        .map(|chunk| chunk.iter().map(|m| m.id.clone()).collect())
        .collect()
}

/// A previewed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub index: usize,
    pub message_id: String,
    pub text: String,
}

/// Fetch the snippets of the first `count` messages, one request each
pub async fn preview<C>(client: &C, messages: &[MessageRef], count: usize) -> Result<Vec<Snippet>>
where
    C: MailboxClient + ?Sized,
{
    let count = count.min(messages.len());
    let mut snippets = Vec::with_capacity(count);

    for (index, message) in messages.iter().take(count).enumerate() {
        let text = client.get_snippet(&message.id).await?;
        snippets.push(Snippet {
            index,
            message_id: message.id.clone(),
            text,
        });
    }

    Ok(snippets)
}

pub fn write_preview<W: Write>(out: &mut W, snippets: &[Snippet]) -> io::Result<()> {
    writeln!(out, "Snippets of first {} messages:", snippets.len())?;
    for snippet in snippets {
        writeln!(out, "Snippet {}: {}", snippet.index, snippet.text)?;
    }
    Ok(())
}

/// Result of the confirm-then-delete phase
#[derive(Debug)]
pub enum DeletionOutcome {
    /// Operator declined; nothing was touched
    Aborted,
    Completed { deleted: usize },
    /// A call was rejected; `deleted` messages were already gone and stay gone
    Failed { deleted: usize, error: PurgeError },
}

/// Confirms with the operator, then trashes or batch-deletes
pub struct DeletionExecutor<'a, C: ?Sized, P: ?Sized> {
    client: &'a C,
    prompter: &'a P,
    reporter: &'a ProgressReporter,
    batch_size: usize,
}

impl<'a, C, P> DeletionExecutor<'a, C, P>
where
    C: MailboxClient + ?Sized,
    P: crate::prompt::Prompter + ?Sized,
{
    pub fn new(client: &'a C, prompter: &'a P, reporter: &'a ProgressReporter) -> Self {
        Self {
            client,
            prompter,
            reporter,
            batch_size: BATCH_DELETE_LIMIT,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, BATCH_DELETE_LIMIT);
        self
    }

    /// Ask once, then remove the first `min(cap, messages.len())` messages
    ///
    /// Service failures stop the loop and come back as
    /// [`DeletionOutcome::Failed`]; only prompt failures are returned as `Err`.
    pub async fn confirm_and_delete(
        &self,
        messages: &[MessageRef],
        cap: usize,
        mode: DeleteMode,
    ) -> Result<DeletionOutcome> {
        let count = num_to_delete(cap, messages.len());
        let targets = &messages[..count];

        let question = mode.confirm_prompt(count);
        let confirmed = match self
            .reporter
            .suspend(|| self.prompter.ask_confirm(&question))
        {
            Ok(answer) => answer,
            Err(PurgeError::OperationCancelled(_)) => false,
            Err(e) => return Err(e),
        };
        if !confirmed {
            info!("Operator declined {} of {} messages", mode, count);
            return Ok(DeletionOutcome::Aborted);
        }

        info!("Starting {} of {} messages", mode, count);
        let outcome = match mode {
            DeleteMode::Trash => self.trash_all(targets).await,
            DeleteMode::BatchDelete => self.batch_delete_all(targets).await,
        };
        Ok(outcome)
    }

    async fn trash_all(&self, targets: &[MessageRef]) -> DeletionOutcome {
        let pb = self
            .reporter
            .add_progress_bar(targets.len() as u64, "Deleted");

        for (done, message) in targets.iter().enumerate() {
            if let Err(e) = self.client.trash_message(&message.id).await {
                pb.abandon_with_message("Failed");
                error!("Trashing {} failed after {} messages: {}", message.id, done, e);
                return DeletionOutcome::Failed {
                    deleted: done,
                    error: e,
                };
            }
            debug!("Trashed {}", message.id);
            pb.inc(1);
        }

        pb.finish();
        DeletionOutcome::Completed {
            deleted: targets.len(),
        }
    }

    async fn batch_delete_all(&self, targets: &[MessageRef]) -> DeletionOutcome {
        let pb = self
            .reporter
            .add_progress_bar(targets.len() as u64, "Deleted");
        let chunks = chunk_ids(targets, self.batch_size);
        let total_chunks = chunks.len();
        let mut deleted = 0;

        for (index, chunk) in chunks.iter().enumerate() {
            if let Err(e) = self.client.batch_delete(chunk).await {
                pb.abandon_with_message("Failed");
                error!(
                    "Batch {}/{} failed after {} messages: {}",
                    index + 1,
                    total_chunks,
                    deleted,
                    e
                );
                return DeletionOutcome::Failed { deleted, error: e };
            }
            deleted += chunk.len();
            debug!("Batch {}/{} deleted {} messages", index + 1, total_chunks, chunk.len());
            pb.inc(chunk.len() as u64);
        }

        pb.finish();
        DeletionOutcome::Completed { deleted }
    }
}
