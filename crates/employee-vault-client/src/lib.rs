//! Secret-service client for Employee Vault.
//!
//! Talks to a Vault-compatible HTTP API for the three things the web app
//! delegates: leasing short-lived database credentials, transit encryption
//! of sensitive fields, and (dormant) format-preserving tokenization.
//!
//! Each capability is a trait so callers can swap the HTTP client for an
//! in-memory double in tests:
//!
//! - [`CredentialBroker`] — `GET /v1/{db_path}`
//! - [`TransitCipher`] — `POST /v1/transit/{encrypt,decrypt}/{key}`
//! - [`Tokenizer`] — `POST /v1/transform/{encode,decode}/masking-role` (feature `transform`)
//!
//! # Example
//!
//! ```rust,no_run
//! use employee_vault_client::{TransitCipher, VaultClient, VaultClientConfig};
//!
//! # async fn example() -> Result<(), employee_vault_client::VaultError> {
//! let client = VaultClient::new(VaultClientConfig {
//!     addr: "http://127.0.0.1:8200".to_owned(),
//!     token: "root".to_owned(),
//!     db_path: "database/creds/app".to_owned(),
//!     transit_key: "employees".to_owned(),
//!     timeout: None,
//! })?;
//! let ciphertext = client.encrypt("a@x.com").await?;
//! assert_eq!(client.decrypt(&ciphertext).await?, "a@x.com");
//! # Ok(())
//! # }
//! ```

mod client;
pub mod envelope;
mod error;
mod memory;
mod types;

pub use client::VaultClient;
pub use error::VaultError;
pub use memory::MemoryCipher;
#[cfg(feature = "transform")]
pub use types::Transformation;
pub use types::LeasedCredentials;

use std::time::Duration;

/// Header carrying the access token on every request.
pub const TOKEN_HEADER: &str = "X-Vault-Token";

/// Connection parameters for [`VaultClient`].
#[derive(Clone)]
pub struct VaultClientConfig {
    /// Service address, e.g. `http://127.0.0.1:8200`.
    pub addr: String,
    /// Access token sent as `X-Vault-Token`.
    pub token: String,
    /// Dynamic database credentials path, e.g. `database/creds/app`.
    pub db_path: String,
    /// Named transit key used for encrypt/decrypt.
    pub transit_key: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for VaultClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClientConfig")
            .field("addr", &self.addr)
            .field("token", &"[redacted]")
            .field("db_path", &self.db_path)
            .field("transit_key", &self.transit_key)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Leases temporary database credentials.
///
/// A fresh lease is requested on every call; nothing is cached and the
/// lease is never renewed or revoked by the caller.
#[async_trait::async_trait]
pub trait CredentialBroker: Send + Sync + 'static {
    /// Read the dynamic-secrets path and return the issued username/password.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Network`] if the service is unreachable,
    /// [`VaultError::Status`] on a non-success response, and
    /// [`VaultError::Decode`] if `data.username` or `data.password` is missing.
    async fn lease_credentials(&self) -> Result<LeasedCredentials, VaultError>;
}

/// Encrypts and decrypts values under a named key held by the service.
#[async_trait::async_trait]
pub trait TransitCipher: Send + Sync + 'static {
    /// Encrypt UTF-8 plaintext, returning a `vault:v{N}:` envelope.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError`] on network, status, or response decode failure.
    async fn encrypt(&self, plaintext: &str) -> Result<String, VaultError>;

    /// Decrypt an envelope back into UTF-8 plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError`] on network or status failure, and
    /// [`VaultError::Decode`] if the returned plaintext is not valid
    /// base64-encoded UTF-8.
    async fn decrypt(&self, ciphertext: &str) -> Result<String, VaultError>;
}

/// Format-preserving tokenization of SSN and phone values.
#[cfg(feature = "transform")]
#[async_trait::async_trait]
pub trait Tokenizer: Send + Sync + 'static {
    /// Mask `value` with the given transformation.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError`] on network, status, or response decode failure.
    async fn encode(&self, value: &str, transformation: Transformation)
    -> Result<String, VaultError>;

    /// Unmask a value previously produced by [`Tokenizer::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`VaultError`] on network, status, or response decode failure.
    async fn decode(&self, value: &str, transformation: Transformation)
    -> Result<String, VaultError>;
}
