//! Gmail label purge
//!
//! Bulk cleanup for a single Gmail account: pick a label, preview what
//! carries it, then move those messages to trash or permanently delete them.
//!
//! # Overview
//!
//! - **Authentication**: OAuth2 installed-app flow with a cached token; the
//!   scope requested depends on the deletion mode
//! - **Enumeration**: label listing and paged message listing up to a cap
//! - **Deletion**: snippet preview, one confirmation, then per-message trash
//!   or chunked `batchDelete` (at most 100 ids per call)
//!
//! # Example Usage
//!
//! ```no_run
//! use gmail_purge::{auth, cli, client::GmailMailboxClient, config::Config};
//! use gmail_purge::{DeleteMode, ProgressReporter, TerminalPrompter};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml".as_ref()).await?;
//!     let token_cache = auth::TokenCache::new(&config.auth.token_cache);
//!     let mode = DeleteMode::Trash;
//!
//!     let hub = auth::initialize_gmail_hub(&config.auth.credentials, &token_cache, mode).await?;
//!     let client = GmailMailboxClient::new(hub, mode, &config.api);
//!
//!     let settings = cli::CleanSettings::from_config(mode, &config, token_cache.path().into());
//!     let outcome = cli::run_clean(
//!         &client,
//!         &TerminalPrompter::new(),
//!         &ProgressReporter::new(),
//!         &settings,
//!         &mut std::io::stdout(),
//!     )
//!     .await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`] - OAuth2 authentication, scopes and the token cache
//! - [`client`] - The `MailboxClient` trait and its Gmail implementation
//! - [`cli`] - Command-line interface and the interactive run
//! - [`config`] - Configuration management
//! - [`enumerator`] - Label listing and paged message enumeration
//! - [`error`] - Error types and result aliases
//! - [`executor`] - Preview, chunking, trash and batch delete
//! - [`models`] - Core data structures
//! - [`progress`] - indicatif progress display
//! - [`prompt`] - Operator prompts

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod enumerator;
pub mod error;
pub mod executor;
pub mod models;
pub mod progress;
pub mod prompt;

pub use error::{PurgeError, Result};

pub use models::{DeleteMode, Label, MessagePage, MessageRef, RunConfig, RunOutcome};

pub use client::{GmailMailboxClient, MailboxClient};

pub use executor::{chunk_ids, num_to_delete, DeletionExecutor, DeletionOutcome, BATCH_DELETE_LIMIT};

pub use progress::ProgressReporter;
pub use prompt::{Prompter, ScriptedPrompter, TerminalPrompter};

pub use config::Config;
