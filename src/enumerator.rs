//! Label listing and paged message enumeration

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::client::MailboxClient;
use crate::error::Result;
use crate::models::{Label, MessageRef};

/// List every label in the account with a single call
pub async fn list_labels<C>(client: &C) -> Result<Vec<Label>>
where
    C: MailboxClient + ?Sized,
{
    let labels = client.list_labels().await?;
    debug!("Account has {} labels", labels.len());
    Ok(labels)
}

/// Collect messages carrying `label_id`, stopping once more than `cap` are held
///
/// The first page is always fetched. Another page is requested only while a
/// continuation token is present and the running total is still `<= cap`, so
/// the result can overshoot `cap` by up to one page; callers truncate with
/// [`crate::executor::num_to_delete`]. `progress` shows the running count.
pub async fn list_messages<C>(
    client: &C,
    label_id: &str,
    cap: usize,
    progress: &ProgressBar,
) -> Result<Vec<MessageRef>>
where
    C: MailboxClient + ?Sized,
{
    let first = client.list_messages_page(label_id, None).await?;

    let Some(mut messages) = first.messages else {
        progress.finish_with_message("Found 0 messages");
        info!("No messages carry label {}", label_id);
        return Ok(Vec::new());
    };
    progress.set_message(format!("Found {} messages", messages.len()));

    let mut next_page_token = first.next_page_token;
    let mut pages = 1usize;

    while let Some(token) = next_page_token.take() {
        if messages.len() > cap {
            break;
        }

        let page = client.list_messages_page(label_id, Some(token)).await?;
        pages += 1;

        match page.messages {
            Some(batch) => messages.extend(batch),
            None => warn!("Page {} for label {} had no messages field", pages, label_id),
        }
        progress.set_message(format!("Found {} messages", messages.len()));

        next_page_token = page.next_page_token;
    }

    progress.finish_with_message(format!("Found {} messages", messages.len()));
    info!(
        "Found {} messages with label {} across {} pages",
        messages.len(),
        label_id,
        pages
    );
    Ok(messages)
}
