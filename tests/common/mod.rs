//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use gmail_purge::client::MailboxClient;
use gmail_purge::error::{PurgeError, Result};
use gmail_purge::models::{Label, MessagePage, MessageRef};
use mockall::mock;
use std::sync::Mutex;

/// Message refs `msg-{start}` .. `msg-{start + count - 1}`
pub fn message_refs(start: usize, count: usize) -> Vec<MessageRef> {
    (start..start + count)
        .map(|i| MessageRef::new(format!("msg-{}", i)))
        .collect()
}

pub fn promo_label() -> Label {
    Label::new("L1", "Promo")
}

pub fn insufficient_permission() -> PurgeError {
    PurgeError::Forbidden("HTTP 403: Insufficient Permission".to_string())
}

/// In-memory mailbox holding one label's messages split into pages
///
/// Page `i` is served for token `page-{i}`; every page but the last carries a
/// continuation token. Calls are recorded for assertions.
pub struct FakeMailbox {
    pub labels: Vec<Label>,
    pub label_id: String,
    pages: Vec<Vec<MessageRef>>,
    omit_messages_field: bool,
    fail_trash_at: Option<usize>,
    fail_batch_at: Option<usize>,
    pub page_requests: Mutex<Vec<Option<String>>>,
    pub snippet_requests: Mutex<Vec<String>>,
    pub trashed: Mutex<Vec<String>>,
    pub batches: Mutex<Vec<Vec<String>>>,
}

impl FakeMailbox {
    /// Label `L1` with pages of the given sizes, ids numbered across pages
    pub fn with_pages(page_sizes: &[usize]) -> Self {
        let mut next = 0;
        let pages = page_sizes
            .iter()
            .map(|&size| {
                let page = message_refs(next, size);
                next += size;
                page
            })
            .collect();

        Self {
            labels: vec![promo_label(), Label::new("INBOX", "INBOX")],
            label_id: "L1".to_string(),
            pages,
            omit_messages_field: false,
            fail_trash_at: None,
            fail_batch_at: None,
            page_requests: Mutex::new(Vec::new()),
            snippet_requests: Mutex::new(Vec::new()),
            trashed: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
        }
    }

    /// A label the service reports without a `messages` field
    pub fn empty_label() -> Self {
        let mut mailbox = Self::with_pages(&[]);
        mailbox.omit_messages_field = true;
        mailbox
    }

    pub fn without_labels(mut self) -> Self {
        self.labels.clear();
        self
    }

    /// Reject the `n`th trash call (0-based)
    pub fn failing_trash_at(mut self, n: usize) -> Self {
        self.fail_trash_at = Some(n);
        self
    }

    /// Reject the `n`th batchDelete call (0-based)
    pub fn failing_batch_at(mut self, n: usize) -> Self {
        self.fail_batch_at = Some(n);
        self
    }

    pub fn page_request_count(&self) -> usize {
        self.page_requests.lock().unwrap().len()
    }

    pub fn trashed(&self) -> Vec<String> {
        self.trashed.lock().unwrap().clone()
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches().iter().map(Vec::len).collect()
    }
}

#[async_trait]
impl MailboxClient for FakeMailbox {
    async fn list_labels(&self) -> Result<Vec<Label>> {
        Ok(self.labels.clone())
    }

    async fn list_messages_page(
        &self,
        label_id: &str,
        page_token: Option<String>,
    ) -> Result<MessagePage> {
        self.page_requests.lock().unwrap().push(page_token.clone());

        if label_id != self.label_id || self.omit_messages_field {
            return Ok(MessagePage::default());
        }

        let index = match page_token.as_deref() {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| PurgeError::BadRequest(format!("bad page token {}", token)))?,
        };

        let Some(messages) = self.pages.get(index) else {
            return Ok(MessagePage {
                messages: Some(Vec::new()),
                next_page_token: None,
            });
        };

        Ok(MessagePage {
            messages: Some(messages.clone()),
            next_page_token: (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1)),
        })
    }

    async fn get_snippet(&self, message_id: &str) -> Result<String> {
        self.snippet_requests
            .lock()
            .unwrap()
            .push(message_id.to_string());
        Ok(format!("snippet of {}", message_id))
    }

    async fn trash_message(&self, message_id: &str) -> Result<()> {
        let mut trashed = self.trashed.lock().unwrap();
        if self.fail_trash_at == Some(trashed.len()) {
            return Err(insufficient_permission());
        }
        trashed.push(message_id.to_string());
        Ok(())
    }

    async fn batch_delete(&self, message_ids: &[String]) -> Result<()> {
        let mut batches = self.batches.lock().unwrap();
        if self.fail_batch_at == Some(batches.len()) {
            return Err(insufficient_permission());
        }
        batches.push(message_ids.to_vec());
        Ok(())
    }
}

// Mock implementation of MailboxClient for expectation-style tests
mock! {
    pub MailboxClient {}

    #[async_trait::async_trait]
    impl MailboxClient for MailboxClient {
        async fn list_labels(&self) -> Result<Vec<Label>>;
        async fn list_messages_page(
            &self,
            label_id: &str,
            page_token: Option<String>,
        ) -> Result<MessagePage>;
        async fn get_snippet(&self, message_id: &str) -> Result<String>;
        async fn trash_message(&self, message_id: &str) -> Result<()>;
        async fn batch_delete(&self, message_ids: &[String]) -> Result<()>;
    }
}
