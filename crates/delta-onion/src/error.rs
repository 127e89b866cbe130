use thiserror::Error;

/// Errors produced anywhere in the onion protocol (builder, layer crypto,
/// payload codec). Variants are terminal — callers never retry with
/// different keys or inputs after seeing one.
#[derive(Debug, Error)]
pub enum OnionError {
    #[error("route must have at least one hop")]
    EmptyRoute,
    #[error("envelope too short or malformed")]
    InvalidEnvelope,
    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u8),
    #[error("AEAD encryption failed")]
    Encrypt,
    #[error("AEAD decryption failed — wrong key or tampered")]
    Decrypt,
    #[error("invalid payload encoding")]
    InvalidPayload,
    #[error("invalid key bytes: {0}")]
    InvalidKey(String),
}
