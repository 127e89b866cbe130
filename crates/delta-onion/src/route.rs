//! Route and hop identity types.

use crate::error::OnionError;

/// One hop in an onion route: its long-term Ed25519 verifying key and the
/// HTTPS URL at which it accepts envelopes.
///
/// Hop identities are read-only and small enough to pass by value; a route
/// is simply an ordered `Vec<OnionHop>` with no back-references or sharing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnionHop {
    /// 32-byte Ed25519 public key of this hop (raw bytes, not hex).
    pub verifying_key: [u8; 32],
    /// HTTP URL where this hop accepts onion packets, e.g. `https://relay.delta.app/hop`.
    pub url: String,
}

impl OnionHop {
    pub fn new(verifying_key: [u8; 32], url: impl Into<String>) -> Self {
        Self {
            verifying_key,
            url: url.into(),
        }
    }

    /// Construct a hop from a 64-char hex-encoded verifying key.
    pub fn from_hex(verifying_key_hex: &str, url: impl Into<String>) -> Result<Self, OnionError> {
        let bytes = hex::decode(verifying_key_hex)
            .map_err(|e| OnionError::InvalidKey(e.to_string()))?;
        let verifying_key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| OnionError::InvalidKey("verifying key must be 32 bytes".to_string()))?;
        Ok(Self::new(verifying_key, url))
    }
}

/// Decode a 32-byte Ed25519 seed from a 64-char hex string.
pub fn seed_from_hex(seed_hex: &str) -> Result<[u8; 32], OnionError> {
    let bytes = hex::decode(seed_hex).map_err(|e| OnionError::InvalidKey(e.to_string()))?;
    bytes
        .try_into()
        .map_err(|_| OnionError::InvalidKey("seed must be 32 bytes".to_string()))
}
