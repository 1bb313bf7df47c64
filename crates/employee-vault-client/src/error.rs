//! Error types for the secret-service client.

/// All errors that can occur when talking to the secret service.
///
/// The variants separate the three failure kinds callers care about: the
/// service could not be reached, it answered with a non-success status, or
/// it answered with a body we could not use.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Missing or invalid client configuration.
    #[error("vault config error: {0}")]
    Config(String),

    /// The request never got a response (connect, TLS, timeout, body read).
    #[error("vault request to '{path}' failed: {source}")]
    Network {
        /// API path relative to `/v1/`.
        path: String,
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("vault returned {status} for '{path}': {message}")]
    Status {
        /// API path relative to `/v1/`.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Error text from the `errors` array, or `HTTP {status}`.
        message: String,
    },

    /// The response body was missing fields or held undecodable data.
    #[error("invalid vault response from '{path}': {reason}")]
    Decode {
        /// API path relative to `/v1/`.
        path: String,
        /// What was wrong with the body.
        reason: String,
    },
}

impl VaultError {
    /// Whether repeating the same request could plausibly succeed.
    ///
    /// Network failures and 429/5xx responses are transient; client errors
    /// and malformed bodies are not. Nothing in this crate retries on its
    /// own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Config(_) | Self::Decode { .. } => false,
        }
    }

    /// HTTP status for [`VaultError::Status`], otherwise `None`.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
