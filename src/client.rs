//! Gmail mailbox access behind a small async trait

use async_trait::async_trait;
use google_gmail1::api::BatchDeleteMessagesRequest;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::{scopes_for, GmailHub};
use crate::config::ApiConfig;
use crate::error::{PurgeError, Result};
use crate::executor::BATCH_DELETE_LIMIT;
use crate::models::{DeleteMode, Label, MessagePage, MessageRef};

/// The mailbox operations a cleanup run sequences
///
/// Every call is a single request; nothing here retries.
#[async_trait]
pub trait MailboxClient: Send + Sync {
    /// List all labels in the account
    async fn list_labels(&self) -> Result<Vec<Label>>;

    /// Fetch one page of messages carrying `label_id`
    ///
    /// `page_token` is the continuation token from the previous page, or
    /// `None` for the first page.
    async fn list_messages_page(
        &self,
        label_id: &str,
        page_token: Option<String>,
    ) -> Result<MessagePage>;

    /// Fetch a message and return its snippet
    async fn get_snippet(&self, message_id: &str) -> Result<String>;

    /// Move a message to trash
    async fn trash_message(&self, message_id: &str) -> Result<()>;

    /// Permanently delete up to [`BATCH_DELETE_LIMIT`] messages in one call
    async fn batch_delete(&self, message_ids: &[String]) -> Result<()>;
}

/// [`MailboxClient`] over the `google-gmail1` hub
///
/// Each request carries the scope the run authorized for, so the hub never
/// asks the authenticator for a token it does not have cached.
pub struct GmailMailboxClient {
    hub: GmailHub,
    scope: &'static str,
    request_timeout: Duration,
    page_size: u32,
}

impl GmailMailboxClient {
    pub fn new(hub: GmailHub, mode: DeleteMode, api: &ApiConfig) -> Self {
        Self {
            hub,
            scope: scopes_for(mode)[0],
            request_timeout: api.request_timeout(),
            page_size: api.page_size,
        }
    }

    pub fn hub(&self) -> &GmailHub {
        &self.hub
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    /// Await one API call, bounded by the request timeout
    async fn call<T, Fut>(&self, operation: &'static str, request: Fut) -> Result<T>
    where
        Fut: Future<Output = std::result::Result<T, google_gmail1::Error>>,
    {
        debug!(operation, "Calling Gmail API");
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(result) => result.map_err(PurgeError::from),
            Err(_) => {
                warn!(
                    "Gmail API {} call timed out after {:?}",
                    operation, self.request_timeout
                );
                Err(PurgeError::Timeout {
                    operation,
                    after: self.request_timeout,
                })
            }
        }
    }
}

#[async_trait]
impl MailboxClient for GmailMailboxClient {
    async fn list_labels(&self) -> Result<Vec<Label>> {
        let (_, response) = self
            .call(
                "labels.list",
                self.hub
                    .users()
                    .labels_list("me")
                    .add_scope(self.scope)
                    .doit(),
            )
            .await?;

        let labels = response
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(|label| -> Result<Label> {
                let id = label.id.ok_or_else(|| {
                    PurgeError::InvalidResponse(format!(
                        "label {:?} has no id",
                        label.name.as_deref().unwrap_or("<unnamed>")
                    ))
                })?;
                // An id is enough to act on; fall back to it for display
                let name = label.name.unwrap_or_else(|| id.clone());
                Ok(Label { id, name })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Parsed {} labels", labels.len());
        Ok(labels)
    }

    async fn list_messages_page(
        &self,
        label_id: &str,
        page_token: Option<String>,
    ) -> Result<MessagePage> {
        let mut call = self
            .hub
            .users()
            .messages_list("me")
            .add_label_ids(label_id)
            .max_results(self.page_size);

        if let Some(token) = page_token.as_deref() {
            call = call.page_token(token);
        }

        let (_, response) = self
            .call("messages.list", call.add_scope(self.scope).doit())
            .await?;

        let messages = response.messages.map(|messages| {
            messages
                .into_iter()
                .filter_map(|message| message.id)
                .map(MessageRef::new)
                .collect::<Vec<_>>()
        });

        debug!(
            label_id,
            count = messages.as_ref().map_or(0, Vec::len),
            has_next = response.next_page_token.is_some(),
            "Fetched message page"
        );

        Ok(MessagePage {
            messages,
            next_page_token: response.next_page_token,
        })
    }

    async fn get_snippet(&self, message_id: &str) -> Result<String> {
        let (_, message) = self
            .call(
                "messages.get",
                self.hub
                    .users()
                    .messages_get("me", message_id)
                    .format("metadata")
                    .add_scope(self.scope)
                    .doit(),
            )
            .await?;

        Ok(message.snippet.unwrap_or_else(|| {
            warn!("Message {} has no snippet", message_id);
            String::new()
        }))
    }

    async fn trash_message(&self, message_id: &str) -> Result<()> {
        self.call(
            "messages.trash",
            self.hub
                .users()
                .messages_trash("me", message_id)
                .add_scope(self.scope)
                .doit(),
        )
        .await?;

        Ok(())
    }

    async fn batch_delete(&self, message_ids: &[String]) -> Result<()> {
        if message_ids.is_empty() {
            return Ok(());
        }
        if message_ids.len() > BATCH_DELETE_LIMIT {
            return Err(PurgeError::BadRequest(format!(
                "batchDelete accepts at most {} ids, got {}",
                BATCH_DELETE_LIMIT,
                message_ids.len()
            )));
        }

        let request = BatchDeleteMessagesRequest {
            ids: Some(message_ids.to_vec()),
        };

        self.call(
            "messages.batchDelete",
            self.hub
                .users()
                .messages_batch_delete(request, "me")
                .add_scope(self.scope)
                .doit(),
        )
        .await?;

        Ok(())
    }
}
