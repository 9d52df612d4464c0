use std::time::Duration;

use thiserror::Error;

/// Type alias for Result with PurgeError
pub type Result<T> = std::result::Result<T, PurgeError>;

/// Error types for the label purge tool
#[derive(Error, Debug)]
pub enum PurgeError {
    /// Gmail API returned an error not covered by a more specific variant
    #[error("Gmail API error: {0}")]
    ApiError(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Token was rejected (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (403), usually a token granted for a narrower scope
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Server returned 5xx error
    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Network-related error (connection issues, TLS, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A single API call exceeded the configured request timeout
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Response was missing a field the tool relies on
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Terminal prompt failed
    #[error("Prompt error: {0}")]
    PromptError(String),

    /// User cancelled operation
    #[error("Operation cancelled: {0}")]
    OperationCancelled(String),

    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PurgeError {
    /// Whether discarding the cached token and re-authorizing is likely to help
    pub fn is_credential_problem(&self) -> bool {
        matches!(
            self,
            PurgeError::AuthError(_) | PurgeError::Unauthorized(_) | PurgeError::Forbidden(_)
        )
    }

    /// Classify a non-success HTTP status
    fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            400 => PurgeError::BadRequest(message),
            401 => PurgeError::Unauthorized(message),
            403 => PurgeError::Forbidden(message),
            404 => PurgeError::NotFound(message),
            429 => PurgeError::RateLimited(message),
            500..=599 => PurgeError::ServerError {
                status: status_code,
                message,
            },
            _ => PurgeError::ApiError(message),
        }
    }
}

impl From<google_gmail1::Error> for PurgeError {
    fn from(error: google_gmail1::Error) -> Self {
        match error {
            google_gmail1::Error::Failure(ref response) => {
                let status = response.status();
                let message = format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                );
                PurgeError::from_status(status.as_u16(), message)
            }
            // Error responses with a JSON body arrive here, not as Failure
            google_gmail1::Error::BadRequest(ref body) => {
                let status_code = body["error"]["code"]
                    .as_u64()
                    .and_then(|code| u16::try_from(code).ok());
                match status_code {
                    Some(code) => {
                        let reason = body["error"]["message"].as_str().unwrap_or("Unknown");
                        PurgeError::from_status(code, format!("HTTP {}: {}", code, reason))
                    }
                    None => PurgeError::BadRequest(body.to_string()),
                }
            }
            google_gmail1::Error::HttpError(ref err) => {
                PurgeError::NetworkError(format!("Connection error: {}", err))
            }
            google_gmail1::Error::Io(err) => PurgeError::NetworkError(err.to_string()),
            google_gmail1::Error::MissingToken(ref err) => {
                PurgeError::AuthError(format!("No token available: {}", err))
            }
            _ => PurgeError::ApiError(error.to_string()),
        }
    }
}
