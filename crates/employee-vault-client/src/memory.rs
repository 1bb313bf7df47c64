//! In-memory transit cipher for testing.
//!
//! Produces well-formed `vault:v{N}:` envelopes without a running service.
//! The payload is plain base64 of the input (an encoding, not encryption),
//! so this must never back a real deployment. Call counters let tests
//! assert which paths reach the cipher.

use std::sync::atomic::{AtomicUsize, Ordering};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::envelope;
use crate::{TransitCipher, VaultError};

const PATH: &str = "transit/memory";

/// A [`TransitCipher`] that round-trips through base64 in process.
#[derive(Debug)]
pub struct MemoryCipher {
    key_version: u32,
    encrypt_calls: AtomicUsize,
    decrypt_calls: AtomicUsize,
}

impl MemoryCipher {
    /// Create a cipher emitting `vault:v1:` envelopes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_version(1)
    }

    /// Create a cipher emitting `vault:v{key_version}:` envelopes.
    #[must_use]
    pub fn with_version(key_version: u32) -> Self {
        Self {
            key_version,
            encrypt_calls: AtomicUsize::new(0),
            decrypt_calls: AtomicUsize::new(0),
        }
    }

    /// Number of `encrypt` calls so far.
    pub fn encrypt_calls(&self) -> usize {
        self.encrypt_calls.load(Ordering::Relaxed)
    }

    /// Number of `decrypt` calls so far, including failed ones.
    pub fn decrypt_calls(&self) -> usize {
        self.decrypt_calls.load(Ordering::Relaxed)
    }
}

impl Default for MemoryCipher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TransitCipher for MemoryCipher {
    async fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
        self.encrypt_calls.fetch_add(1, Ordering::Relaxed);
        Ok(format!(
            "{}:v{}:{}",
            envelope::SCHEME,
            self.key_version,
            BASE64.encode(plaintext.as_bytes())
        ))
    }

    async fn decrypt(&self, ciphertext: &str) -> Result<String, VaultError> {
        self.decrypt_calls.fetch_add(1, Ordering::Relaxed);

        // Mirror the service: anything that is not an envelope is a 400.
        let payload = envelope::key_version(ciphertext)
            .and_then(|_| ciphertext.splitn(3, ':').nth(2))
            .ok_or_else(|| VaultError::Status {
                path: PATH.to_owned(),
                status: 400,
                message: "invalid ciphertext: no prefix".to_owned(),
            })?;

        let raw = BASE64.decode(payload).map_err(|e| VaultError::Status {
            path: PATH.to_owned(),
            status: 400,
            message: format!("invalid ciphertext: {e}"),
        })?;
        String::from_utf8(raw).map_err(|e| VaultError::Decode {
            path: PATH.to_owned(),
            reason: e.to_string(),
        })
    }
}
