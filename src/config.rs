use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PurgeError, Result};
use crate::executor::BATCH_DELETE_LIMIT;
use crate::models::DeleteMode;

/// Largest page Gmail will return from `messages.list`
pub const MAX_PAGE_SIZE: u32 = 500;

/// Upper bound on snippets fetched before confirmation
pub const MAX_PREVIEW_COUNT: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub purge: PurgeConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_credentials")]
    pub credentials: PathBuf,
    #[serde(default = "default_token_cache")]
    pub token_cache: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            credentials: default_credentials(),
            token_cache: default_token_cache(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeConfig {
    #[serde(default = "default_preview_count")]
    pub preview_count: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub default_mode: DeleteMode,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            preview_count: default_preview_count(),
            batch_size: default_batch_size(),
            default_mode: DeleteMode::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_credentials() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_cache() -> PathBuf {
    PathBuf::from(".gmail-purge/token.json")
}

fn default_preview_count() -> usize {
    10
}

fn default_batch_size() -> usize {
    BATCH_DELETE_LIMIT
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // A missing config file is normal; everything has a default
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PurgeError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| PurgeError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    PurgeError::ConfigError(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| PurgeError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| PurgeError::ConfigError(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.auth.token_cache.as_os_str().is_empty() {
            return Err(PurgeError::ConfigError(
                "auth.token_cache cannot be empty".to_string(),
            ));
        }

        if self.purge.preview_count > MAX_PREVIEW_COUNT {
            return Err(PurgeError::ConfigError(format!(
                "purge.preview_count cannot exceed {}",
                MAX_PREVIEW_COUNT
            )));
        }

        // batchDelete rejects more than 100 ids per call
        if self.purge.batch_size == 0 {
            return Err(PurgeError::ConfigError(
                "purge.batch_size must be at least 1".to_string(),
            ));
        }
        if self.purge.batch_size > BATCH_DELETE_LIMIT {
            return Err(PurgeError::ConfigError(format!(
                "purge.batch_size cannot exceed {} (Gmail batchDelete limit)",
                BATCH_DELETE_LIMIT
            )));
        }

        if self.api.request_timeout_secs == 0 {
            return Err(PurgeError::ConfigError(
                "api.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.api.page_size == 0 || self.api.page_size > MAX_PAGE_SIZE {
            return Err(PurgeError::ConfigError(format!(
                "api.page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Create an example configuration file
    pub async fn create_example(path: &Path) -> Result<()> {
        let config = Self::default();
        config.save(path).await
    }
}
