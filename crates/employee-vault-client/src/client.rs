//! HTTP client implementation.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::VaultError;
#[cfg(feature = "transform")]
use crate::types::{DecodeData, EncodeData, TransformRequest, Transformation};
use crate::types::{
    ApiErrorBody, CredentialData, DecryptData, DecryptRequest, EncryptData, EncryptRequest,
    LeasedCredentials, VaultResponse,
};
use crate::{CredentialBroker, TOKEN_HEADER, TransitCipher, VaultClientConfig};

/// Role holding the format-preserving transformations.
#[cfg(feature = "transform")]
const TRANSFORM_ROLE: &str = "masking-role";

/// HTTP client for a Vault-compatible secret service.
///
/// Cheap to share behind an `Arc`; the inner `reqwest::Client` pools
/// connections to the service.
pub struct VaultClient {
    http: reqwest::Client,
    addr: String,
    token: String,
    db_path: String,
    transit_key: String,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("addr", &self.addr)
            .field("db_path", &self.db_path)
            .field("transit_key", &self.transit_key)
            .finish_non_exhaustive()
    }
}

impl VaultClient {
    /// Build a client from connection parameters.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Config`] if the address, token, credentials
    /// path, or key name is empty, and [`VaultError::Network`] if the HTTP
    /// client cannot be constructed.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(cfg: VaultClientConfig) -> Result<Self, VaultError> {
        let addr = cfg.addr.trim().trim_end_matches('/').to_owned();
        if addr.is_empty() {
            return Err(VaultError::Config("missing vault address".to_owned()));
        }
        if cfg.token.trim().is_empty() {
            return Err(VaultError::Config("missing vault token".to_owned()));
        }
        let db_path = cfg.db_path.trim().trim_matches('/').to_owned();
        if db_path.is_empty() {
            return Err(VaultError::Config(
                "missing database credentials path".to_owned(),
            ));
        }
        if cfg.transit_key.trim().is_empty() {
            return Err(VaultError::Config("missing transit key name".to_owned()));
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("employee-vault/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|source| VaultError::Network {
            path: String::new(),
            source,
        })?;

        Ok(Self {
            http,
            addr,
            token: cfg.token,
            db_path,
            transit_key: cfg.transit_key.trim().to_owned(),
        })
    }

    /// Service address without a trailing slash.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Probe `GET /v1/sys/health` and return the HTTP status.
    ///
    /// Any status counts as a response: the health endpoint uses non-2xx
    /// codes to report sealed or standby nodes.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Network`] if the service cannot be reached.
    pub async fn health(&self) -> Result<u16, VaultError> {
        let path = "sys/health";
        let resp = self
            .http
            .get(self.url(path))
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|source| VaultError::Network {
                path: path.to_owned(),
                source,
            })?;
        Ok(resp.status().as_u16())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.addr)
    }

    fn transit_path(&self, op: &str) -> String {
        format!("transit/{op}/{}", urlencoding::encode(&self.transit_key))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, VaultError> {
        let req = self
            .http
            .get(self.url(path))
            .header(TOKEN_HEADER, &self.token);
        send(req, path).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, VaultError> {
        let req = self
            .http
            .post(self.url(path))
            .header(TOKEN_HEADER, &self.token)
            .json(body);
        send(req, path).await
    }
}

/// Send a request and decode a success body, mapping every failure to a kind.
async fn send<T: DeserializeOwned>(
    req: reqwest::RequestBuilder,
    path: &str,
) -> Result<T, VaultError> {
    let resp = req.send().await.map_err(|source| VaultError::Network {
        path: path.to_owned(),
        source,
    })?;

    let status = resp.status();
    let text = resp.text().await.map_err(|source| VaultError::Network {
        path: path.to_owned(),
        source,
    })?;

    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .map(|b| b.errors.join("; "))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        return Err(VaultError::Status {
            path: path.to_owned(),
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&text).map_err(|e| VaultError::Decode {
        path: path.to_owned(),
        reason: e.to_string(),
    })
}

#[async_trait::async_trait]
impl CredentialBroker for VaultClient {
    async fn lease_credentials(&self) -> Result<LeasedCredentials, VaultError> {
        debug!(addr = %self.addr, path = %self.db_path, "fetching database credentials");

        let resp: VaultResponse<CredentialData> = self
            .get_json(&self.db_path)
            .await
            .inspect_err(|e| {
                error!(
                    path = %self.db_path,
                    error = %e,
                    "failed to fetch database credentials"
                );
            })?;

        debug!(
            username = %resp.data.username,
            lease_id = %resp.lease_id,
            lease_duration = resp.lease_duration,
            "database credentials leased"
        );

        Ok(LeasedCredentials {
            username: resp.data.username,
            password: resp.data.password,
            lease_id: Some(resp.lease_id).filter(|id| !id.is_empty()),
            lease_duration_secs: resp.lease_duration,
        })
    }
}

#[async_trait::async_trait]
impl TransitCipher for VaultClient {
    async fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
        let path = self.transit_path("encrypt");
        debug!(key = %self.transit_key, len = plaintext.len(), "encrypting value");

        let encoded = BASE64.encode(plaintext.as_bytes());
        let resp: VaultResponse<EncryptData> = self
            .post_json(&path, &EncryptRequest { plaintext: &encoded })
            .await
            .inspect_err(|e| {
                error!(key = %self.transit_key, error = %e, "encryption failed");
            })?;

        Ok(resp.data.ciphertext)
    }

    async fn decrypt(&self, ciphertext: &str) -> Result<String, VaultError> {
        let path = self.transit_path("decrypt");
        debug!(key = %self.transit_key, "decrypting value");

        let resp: VaultResponse<DecryptData> = self
            .post_json(&path, &DecryptRequest { ciphertext })
            .await
            .inspect_err(|e| {
                error!(key = %self.transit_key, error = %e, "decryption failed");
            })?;

        let raw = BASE64
            .decode(resp.data.plaintext.as_bytes())
            .map_err(|e| VaultError::Decode {
                path: path.clone(),
                reason: format!("plaintext is not base64: {e}"),
            })?;
        String::from_utf8(raw).map_err(|e| VaultError::Decode {
            path,
            reason: format!("plaintext is not UTF-8: {e}"),
        })
    }
}

#[cfg(feature = "transform")]
#[async_trait::async_trait]
impl crate::Tokenizer for VaultClient {
    async fn encode(
        &self,
        value: &str,
        transformation: Transformation,
    ) -> Result<String, VaultError> {
        let path = format!("transform/encode/{TRANSFORM_ROLE}");
        debug!(transformation = transformation.name(), "encoding value");

        let body = TransformRequest {
            value,
            transformation: transformation.name(),
        };
        let resp: VaultResponse<EncodeData> = self
            .post_json(&path, &body)
            .await
            .inspect_err(|e| {
                error!(
                    transformation = transformation.name(),
                    error = %e,
                    "encoding failed"
                );
            })?;

        Ok(resp.data.encoded_value)
    }

    async fn decode(
        &self,
        value: &str,
        transformation: Transformation,
    ) -> Result<String, VaultError> {
        let path = format!(
            "transform/decode/{TRANSFORM_ROLE}/{}",
            transformation.decode_variant()
        );
        debug!(transformation = transformation.name(), "decoding value");

        let body = TransformRequest {
            value,
            transformation: transformation.name(),
        };
        let resp: VaultResponse<DecodeData> = self
            .post_json(&path, &body)
            .await
            .inspect_err(|e| {
                error!(
                    transformation = transformation.name(),
                    error = %e,
                    "decoding failed"
                );
            })?;

        Ok(resp.data.decoded_value)
    }
}
