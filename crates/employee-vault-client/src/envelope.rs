//! Ciphertext envelope helpers.
//!
//! Transit ciphertext has the form `vault:v{version}:{base64}`. The web app
//! treats it as opaque; the only thing it inspects is the prefix, to decide
//! whether a stored value needs decrypting at all.

/// Scheme segment of every envelope.
pub const SCHEME: &str = "vault";

/// Return the key version of an envelope, or `None` if `value` does not
/// start with `vault:v{digits}:`.
pub fn key_version(value: &str) -> Option<u32> {
    let rest = value.strip_prefix(SCHEME)?.strip_prefix(":v")?;
    let (version, _payload) = rest.split_once(':')?;
    if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    version.parse().ok()
}

/// Whether `value` carries the envelope prefix.
///
/// Stored values without it are plaintext written before encryption was
/// in place (or by a failed write) and must be shown as-is.
pub fn is_ciphertext(value: &str) -> bool {
    key_version(value).is_some()
}
