use anyhow::Result;
use clap::Parser;
use gmail_purge::auth::{self, TokenCache};
use gmail_purge::cli::{self, Cli, CleanSettings, Commands};
use gmail_purge::client::GmailMailboxClient;
use gmail_purge::config::Config;
use gmail_purge::enumerator;
use gmail_purge::error::PurgeError;
use gmail_purge::progress::ProgressReporter;
use gmail_purge::prompt::TerminalPrompter;
use gmail_purge::RunOutcome;
use indicatif::MultiProgress;
use std::io::Write;
use std::process;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// A writer that prints through MultiProgress to avoid progress bar conflicts
#[derive(Clone)]
struct MultiProgressWriter {
    multi: Arc<MultiProgress>,
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MultiProgressWriter {
    fn new(multi: Arc<MultiProgress>) -> Self {
        Self {
            multi,
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Write for MultiProgressWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "log buffer poisoned"))?;
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "log buffer poisoned"))?;
        if !buffer.is_empty() {
            let msg = String::from_utf8_lossy(&buffer);
            let msg = msg.trim_end_matches('\n');
            if !msg.is_empty() {
                let _ = self.multi.println(msg);
            }
            buffer.clear();
        }
        Ok(())
    }
}

impl Drop for MultiProgressWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// MakeWriter implementation for tracing
#[derive(Clone)]
struct MultiProgressMakeWriter {
    multi: Arc<MultiProgress>,
}

impl<'a> MakeWriter<'a> for MultiProgressMakeWriter {
    type Writer = MultiProgressWriter;

    fn make_writer(&'a self) -> Self::Writer {
        MultiProgressWriter::new(Arc::clone(&self.multi))
    }
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            display_error(&e);
            eprintln!("\nFor help, run: gmail-purge --help");
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the run ended in a reported deletion failure
async fn run() -> Result<bool> {
    // Several dependencies pull in rustls; pick the provider explicitly
    #[cfg(not(windows))]
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    #[cfg(windows)]
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_purge=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gmail_purge=info,warn"))
    };

    let multi_progress = Arc::new(MultiProgress::new());
    let make_writer = MultiProgressMakeWriter {
        multi: Arc::clone(&multi_progress),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let config = Config::load(&cli.config).await?;
    let credentials = cli.credentials_path(&config);
    let token_cache = TokenCache::new(cli.token_cache_path(&config));

    match cli.command {
        Commands::Auth { force, permanent } => {
            if force && token_cache.discard().await? {
                println!("Removed cached token at {}", token_cache.path().display());
            }

            let mode = cli::resolve_mode(permanent, &config);
            let hub = auth::initialize_gmail_hub(&credentials, &token_cache, mode).await?;
            let client = GmailMailboxClient::new(hub, mode, &config.api);

            println!("Successfully authenticated with Gmail API ({} scope)", mode);
            println!("Token cached at: {}", token_cache.path().display());

            let (_, profile) = client
                .hub()
                .users()
                .get_profile("me")
                .add_scope(client.scope())
                .doit()
                .await
                .map_err(PurgeError::from)?;
            println!(
                "Connected to account: {}",
                profile.email_address.unwrap_or_default()
            );

            Ok(true)
        }

        Commands::Labels => {
            let mode = config.purge.default_mode;
            let hub = auth::initialize_gmail_hub(&credentials, &token_cache, mode).await?;
            let client = GmailMailboxClient::new(hub, mode, &config.api);

            let labels = enumerator::list_labels(&client).await?;
            let mut stdout = std::io::stdout();
            if labels.is_empty() {
                writeln!(stdout, "No labels found.")?;
            } else {
                cli::print_labels(&mut stdout, &labels)?;
            }

            Ok(true)
        }

        Commands::Clean { permanent } => {
            let mode = cli::resolve_mode(permanent, &config);
            tracing::info!("Starting {} run", mode);
            if !mode.is_recoverable() {
                println!("Running in PERMANENT DELETE mode - deleted messages cannot be recovered");
            }

            let hub = auth::initialize_gmail_hub(&credentials, &token_cache, mode).await?;
            let client = GmailMailboxClient::new(hub, mode, &config.api);

            let reporter = ProgressReporter::with_multi_progress((*multi_progress).clone());
            let settings =
                CleanSettings::from_config(mode, &config, token_cache.path().to_path_buf());
            let prompter = TerminalPrompter::new();
            let mut stdout = std::io::stdout();

            let outcome =
                cli::run_clean(&client, &prompter, &reporter, &settings, &mut stdout)
                    .await?;
            if let RunOutcome::Finished { deleted } = &outcome {
                tracing::info!("Run finished after removing {} messages", deleted);
            }

            Ok(!outcome.is_failure())
        }

        Commands::InitConfig { output, force } => {
            if output.exists() && !force {
                return Err(PurgeError::ConfigError(format!(
                    "Configuration file already exists at {:?}. Use --force to overwrite.",
                    output
                ))
                .into());
            }

            Config::create_example(&output).await?;

            println!("Created example configuration file at: {:?}", output);
            println!("\nKey settings to review:");
            println!("  - purge.default_mode: 'trash' (recoverable) or 'batch-delete' (permanent)");
            println!("  - purge.preview_count: snippets shown before confirming");
            println!("  - auth.credentials: OAuth2 client secret downloaded from Google Cloud Console");

            Ok(true)
        }
    }
}

/// Display error with context
fn display_error(error: &anyhow::Error) {
    eprintln!("Error: {}", error);

    let mut cause = error.source();
    while let Some(e) = cause {
        eprintln!("  Caused by: {}", e);
        cause = e.source();
    }

    if let Some(purge_err) = error.downcast_ref::<PurgeError>() {
        match purge_err {
            e if e.is_credential_problem() => {
                eprintln!("\nHint: The cached token may be stale or missing a scope.");
                eprintln!("      Try running: gmail-purge auth --force");
            }
            PurgeError::ConfigError(_) => {
                eprintln!("\nHint: Check your configuration file for errors.");
                eprintln!("      Run: gmail-purge init-config --force");
            }
            PurgeError::RateLimited(_) | PurgeError::ServerError { .. } => {
                eprintln!("\nHint: This may be a temporary API error.");
                eprintln!("      Try running the command again.");
            }
            _ => {}
        }
    }
}
