use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PurgeError;

/// A Gmail label as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
}

impl Label {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Reference to a message returned by a listing call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: String,
}

impl MessageRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// One page of a `messages.list` response
///
/// `messages` is `None` when the service omitted the field entirely, which
/// Gmail does for a label with no messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePage {
    pub messages: Option<Vec<MessageRef>>,
    pub next_page_token: Option<String>,
}

/// How matched messages get removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeleteMode {
    /// Move each message to trash; recoverable for 30 days
    #[default]
    Trash,
    /// `messages.batchDelete`; messages are destroyed immediately
    BatchDelete,
}

impl DeleteMode {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DeleteMode::Trash)
    }

    /// Confirmation question asked before the first destructive call
    pub fn confirm_prompt(&self, count: usize) -> String {
        match self {
            DeleteMode::Trash => format!("Begin moving {} messages to trash?", count),
            DeleteMode::BatchDelete => format!(
                "Begin PERMANENTLY deleting {} messages? This cannot be undone.",
                count
            ),
        }
    }
}

impl fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteMode::Trash => write!(f, "trash"),
            DeleteMode::BatchDelete => write!(f, "batch-delete"),
        }
    }
}

/// Choices fixed for the duration of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub label_id: String,
    pub max_messages: usize,
    pub mode: DeleteMode,
}

/// How a cleanup run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// The account reported no labels; nothing was searched
    NoLabels,
    /// The operator declined the confirmation prompt
    Aborted,
    /// Every selected message was trashed or deleted
    Finished { deleted: usize },
    /// The service rejected a call part way through
    Failed { deleted: usize, error: PurgeError },
}

impl RunOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_mode_recoverability() {
        assert!(DeleteMode::Trash.is_recoverable());
        assert!(!DeleteMode::BatchDelete.is_recoverable());
        assert_eq!(DeleteMode::default(), DeleteMode::Trash);
    }

    #[test]
    fn test_confirm_prompt_differs_by_mode() {
        let trash = DeleteMode::Trash.confirm_prompt(12);
        let permanent = DeleteMode::BatchDelete.confirm_prompt(12);

        assert!(trash.contains("12 messages to trash"));
        assert!(permanent.contains("PERMANENTLY"));
        assert_ne!(trash, permanent);
    }

    #[test]
    fn test_delete_mode_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: DeleteMode,
        }

        let parsed: Wrapper = toml::from_str(r#"mode = "batch-delete""#).unwrap();
        assert_eq!(parsed.mode, DeleteMode::BatchDelete);
        assert_eq!(DeleteMode::BatchDelete.to_string(), "batch-delete");
    }

    #[test]
    fn test_run_outcome_failure() {
        let failed = RunOutcome::Failed {
            deleted: 100,
            error: PurgeError::Forbidden("Insufficient Permission".to_string()),
        };
        assert!(failed.is_failure());
        assert!(!RunOutcome::Finished { deleted: 3 }.is_failure());
        assert!(!RunOutcome::Aborted.is_failure());
    }
}
