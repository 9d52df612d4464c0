//! OAuth2 authentication and token cache handling for the Gmail API

use google_gmail1::{hyper_rustls, hyper_util, yup_oauth2, Gmail};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use yup_oauth2::ApplicationSecret;

use crate::error::{PurgeError, Result};
use crate::models::DeleteMode;

/// Read/write access without permanent deletion; enough for `messages.trash`
pub const MODIFY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";

/// Full mailbox access; `messages.batchDelete` refuses anything narrower
pub const FULL_MAILBOX_SCOPE: &str = "https://mail.google.com/";

/// Type alias for Gmail Hub to simplify type signatures
pub type GmailHub = Gmail<hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>>;

/// Scopes a run needs for the given deletion mode
pub fn scopes_for(mode: DeleteMode) -> &'static [&'static str] {
    match mode {
        DeleteMode::Trash => &[MODIFY_SCOPE],
        DeleteMode::BatchDelete => &[FULL_MAILBOX_SCOPE],
    }
}

/// The on-disk token written by the installed-app flow
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove the cached token so the next run goes through the browser flow
    ///
    /// Returns `false` when there was nothing to remove.
    pub async fn discard(&self) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }
        tokio::fs::remove_file(&self.path).await?;
        info!("Removed cached token at {:?}", self.path);
        Ok(true)
    }

    /// Restrict the token file to its owner (0600)
    #[cfg(unix)]
    pub async fn secure(&self) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = tokio::fs::metadata(&self.path).await?.permissions();
        perms.set_mode(0o600);
        tokio::fs::set_permissions(&self.path, perms).await?;
        Ok(())
    }

    /// Windows uses ACLs; the file inherits the profile directory's
    #[cfg(windows)]
    pub async fn secure(&self) -> Result<()> {
        Ok(())
    }
}

/// Initialize Gmail API hub with OAuth2 authentication
///
/// Sets up the installed-app (desktop) flow with the token persisted to
/// `token_cache`, obtains a token for the scopes `mode` requires so the
/// browser prompt happens here rather than mid-run, and builds an HTTP/1
/// client with TLS.
pub async fn initialize_gmail_hub(
    credentials_path: &Path,
    token_cache: &TokenCache,
    mode: DeleteMode,
) -> Result<GmailHub> {
    let secret = load_application_secret(credentials_path).await?;

    if let Some(parent) = token_cache.path().parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    // HTTPRedirect opens a browser for user authorization
    let auth = yup_oauth2::InstalledFlowAuthenticator::builder(
        secret,
        yup_oauth2::InstalledFlowReturnMethod::HTTPRedirect,
    )
    .persist_tokens_to_disk(token_cache.path())
    .build()
    .await
    .map_err(|e| PurgeError::AuthError(format!("Failed to build authenticator: {}", e)))?;

    let scopes = scopes_for(mode);
    debug!(?scopes, "Requesting token");
    let _token = auth
        .token(scopes)
        .await
        .map_err(|e| PurgeError::AuthError(format!("Failed to obtain token: {}", e)))?;

    if token_cache.exists() {
        token_cache.secure().await?;
    }

    // HTTP/1 works better with google-gmail1 than the HTTP/2 default
    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()
                .map_err(|e| PurgeError::AuthError(format!("Failed to load TLS roots: {}", e)))?
                .https_or_http()
                .enable_http1()
                .build(),
        );

    Ok(Gmail::new(client, auth))
}

/// Read the OAuth2 client secret
///
/// Uses the Google "installed app" JSON at `credentials_path` when it exists,
/// otherwise falls back to [`load_credentials_from_env`].
pub async fn load_application_secret(credentials_path: &Path) -> Result<ApplicationSecret> {
    if credentials_path.exists() {
        return yup_oauth2::read_application_secret(credentials_path)
            .await
            .map_err(|e| {
                PurgeError::AuthError(format!(
                    "Failed to read credentials from {:?}: {}",
                    credentials_path, e
                ))
            });
    }

    debug!(
        "No credentials file at {:?}, trying environment",
        credentials_path
    );
    load_credentials_from_env().map_err(|e| {
        PurgeError::AuthError(format!(
            "No credentials file at {:?} and {}",
            credentials_path, e
        ))
    })
}

/// Load OAuth2 credentials from environment variables
///
/// # Environment Variables
/// - `GMAIL_CLIENT_ID`: OAuth2 client ID
/// - `GMAIL_CLIENT_SECRET`: OAuth2 client secret
/// - `GMAIL_REDIRECT_URI`: Redirect URI (optional, defaults to http://localhost:8080)
pub fn load_credentials_from_env() -> Result<ApplicationSecret> {
    let client_id = env::var("GMAIL_CLIENT_ID")
        .map_err(|_| PurgeError::ConfigError("GMAIL_CLIENT_ID not set".to_string()))?;
    let client_secret = env::var("GMAIL_CLIENT_SECRET")
        .map_err(|_| PurgeError::ConfigError("GMAIL_CLIENT_SECRET not set".to_string()))?;
    let redirect_uri = env::var("GMAIL_REDIRECT_URI")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());

    Ok(ApplicationSecret {
        client_id,
        client_secret,
        auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
        token_uri: "https://oauth2.googleapis.com/token".to_string(),
        redirect_uris: vec![redirect_uri],
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_scopes_follow_mode() {
        assert_eq!(scopes_for(DeleteMode::Trash), &[MODIFY_SCOPE]);
        assert_eq!(scopes_for(DeleteMode::BatchDelete), &[FULL_MAILBOX_SCOPE]);
    }

    #[tokio::test]
    async fn test_token_cache_discard() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path().join("token.json"));

        assert!(!cache.discard().await.unwrap());

        tokio::fs::write(cache.path(), "{}").await.unwrap();
        assert!(cache.exists());
        assert!(cache.discard().await.unwrap());
        assert!(!cache.exists());
    }

    #[tokio::test]
    async fn test_token_cache_secure() {
        let temp_file = NamedTempFile::new().unwrap();
        tokio::fs::write(temp_file.path(), "token").await.unwrap();

        let cache = TokenCache::new(temp_file.path());
        cache.secure().await.unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = tokio::fs::metadata(temp_file.path()).await.unwrap();
            assert_eq!(metadata.permissions().mode() & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn test_load_application_secret_from_file() {
        let credentials_json = r#"{
            "installed": {
                "client_id": "test-client-id",
                "project_id": "test-project",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "client_secret": "test-secret",
                "redirect_uris": ["http://localhost"]
            }
        }"#;

        let temp_file = NamedTempFile::new().unwrap();
        tokio::fs::write(temp_file.path(), credentials_json)
            .await
            .unwrap();

        let secret = load_application_secret(temp_file.path()).await.unwrap();
        assert_eq!(secret.client_id, "test-client-id");
        assert_eq!(secret.client_secret, "test-secret");
    }

    #[tokio::test]
    #[serial]
    async fn test_load_application_secret_missing_everything() {
        env::remove_var("GMAIL_CLIENT_ID");
        env::remove_var("GMAIL_CLIENT_SECRET");

        let dir = TempDir::new().unwrap();
        let err = load_application_secret(&dir.path().join("credentials.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, PurgeError::AuthError(ref msg) if msg.contains("GMAIL_CLIENT_ID")));
    }

    #[test]
    #[serial]
    fn test_load_credentials_from_env() {
        env::set_var("GMAIL_CLIENT_ID", "test-id");
        env::set_var("GMAIL_CLIENT_SECRET", "test-secret");
        env::set_var("GMAIL_REDIRECT_URI", "http://localhost:9999");

        let secret = load_credentials_from_env().unwrap();
        assert_eq!(secret.client_id, "test-id");
        assert_eq!(secret.client_secret, "test-secret");
        assert_eq!(secret.redirect_uris[0], "http://localhost:9999");

        env::remove_var("GMAIL_CLIENT_ID");
        env::remove_var("GMAIL_CLIENT_SECRET");
        env::remove_var("GMAIL_REDIRECT_URI");
    }

    #[test]
    #[serial]
    fn test_load_credentials_from_env_default_redirect() {
        env::set_var("GMAIL_CLIENT_ID", "test-id");
        env::set_var("GMAIL_CLIENT_SECRET", "test-secret");
        env::remove_var("GMAIL_REDIRECT_URI");

        let secret = load_credentials_from_env().unwrap();
        assert_eq!(secret.redirect_uris[0], "http://localhost:8080");

        env::remove_var("GMAIL_CLIENT_ID");
        env::remove_var("GMAIL_CLIENT_SECRET");
    }
}
