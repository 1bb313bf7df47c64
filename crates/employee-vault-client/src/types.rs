//! Public and wire types for the secret-service client.

use serde::{Deserialize, Serialize};

/// Database credentials issued by the dynamic-secrets endpoint.
#[derive(Clone)]
pub struct LeasedCredentials {
    /// Generated database username.
    pub username: String,
    /// Generated database password. Never logged.
    pub password: String,
    /// Lease identifier, if the service returned one.
    pub lease_id: Option<String>,
    /// Lease duration in seconds as reported by the service.
    pub lease_duration_secs: u64,
}

impl std::fmt::Debug for LeasedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeasedCredentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("lease_id", &self.lease_id)
            .field("lease_duration_secs", &self.lease_duration_secs)
            .finish()
    }
}

/// Format-preserving transformations configured on the `masking-role`.
#[cfg(feature = "transform")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transformation {
    /// Social security numbers; decoding reveals the last four digits.
    Ssn,
    /// Phone numbers; decoding reveals the full value.
    Phone,
}

#[cfg(feature = "transform")]
impl Transformation {
    /// Transformation name as configured on the service.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ssn => "ssn-fpe",
            Self::Phone => "phone-fpe",
        }
    }

    /// Decode variant appended to the decode path.
    pub fn decode_variant(self) -> &'static str {
        match self {
            Self::Ssn => "last-four",
            Self::Phone => "full",
        }
    }
}

// --- Internal API types ---

/// Standard response wrapper: payload under `data`, lease info alongside.
#[derive(Deserialize)]
pub(crate) struct VaultResponse<T> {
    pub data: T,
    #[serde(default)]
    pub lease_id: String,
    #[serde(default)]
    pub lease_duration: u64,
}

#[derive(Deserialize)]
pub(crate) struct CredentialData {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub(crate) struct EncryptRequest<'a> {
    /// Base64-encoded plaintext.
    pub plaintext: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct EncryptData {
    pub ciphertext: String,
}

#[derive(Serialize)]
pub(crate) struct DecryptRequest<'a> {
    pub ciphertext: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct DecryptData {
    /// Base64-encoded plaintext.
    pub plaintext: String,
}

#[cfg(feature = "transform")]
#[derive(Serialize)]
pub(crate) struct TransformRequest<'a> {
    pub value: &'a str,
    pub transformation: &'static str,
}

#[cfg(feature = "transform")]
#[derive(Deserialize)]
pub(crate) struct EncodeData {
    pub encoded_value: String,
}

#[cfg(feature = "transform")]
#[derive(Deserialize)]
pub(crate) struct DecodeData {
    pub decoded_value: String,
}

#[derive(Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let creds = LeasedCredentials {
            username: "v-app-1".to_owned(),
            password: "hunter2".to_owned(),
            lease_id: None,
            lease_duration_secs: 0,
        };
        let out = format!("{creds:?}");
        assert!(out.contains("v-app-1"));
        assert!(!out.contains("hunter2"));
    }

    #[cfg(feature = "transform")]
    #[test]
    fn transformation_names_and_variants() {
        assert_eq!(Transformation::Ssn.name(), "ssn-fpe");
        assert_eq!(Transformation::Ssn.decode_variant(), "last-four");
        assert_eq!(Transformation::Phone.name(), "phone-fpe");
        assert_eq!(Transformation::Phone.decode_variant(), "full");
    }
}
