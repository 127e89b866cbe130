//! Single-layer onion crypto: encrypt one payload to one hop's public key,
//! decrypt one envelope with one hop's private seed.
//!
//! Envelope (wire, per layer):
//! ```text
//!  offset  size  field
//!    0      1    version  (constant 0x02)
//!    1     32    epk      (sender's one-shot X25519 public key for this layer)
//!   33     24    nonce    (XChaCha20-Poly1305 nonce, uniformly random per layer)
//!   57      *    ciphertext (AEAD output; includes 16-byte authentication tag)
//! ```

use chacha20poly1305::{aead::Aead, AeadCore, KeyInit, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519Public};

use crate::crypto::{derive_aead_key, ed25519_pubkey_to_x25519, ed25519_seed_to_x25519};
use crate::error::OnionError;
use crate::payload::{decode_payload, encode_payload, OnionPayload};

const VERSION: u8 = 0x02;
const EPK_LEN: usize = 32;
const NONCE_LEN: usize = 24;
const MIN_LEN: usize = 1 + EPK_LEN + NONCE_LEN + 16;
const HKDF_INFO: &[u8] = b"delta:onion:v1";

/// Encrypt `payload` for `hop_verifying_key` (32-byte Ed25519 verifying key).
///
/// Fails with `OnionError::Encrypt` only on internal cipher errors, which
/// should not occur for valid-length inputs.
pub fn encrypt_layer(
    payload: &OnionPayload,
    hop_verifying_key: &[u8; 32],
) -> Result<Vec<u8>, OnionError> {
    let recipient_x25519 = ed25519_pubkey_to_x25519(hop_verifying_key);

    let ephemeral_secret = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = X25519Public::from(&ephemeral_secret);

    let shared = ephemeral_secret.diffie_hellman(&recipient_x25519);
    let aead_key = derive_aead_key(shared.as_bytes(), ephemeral_public.as_bytes(), HKDF_INFO);

    let plaintext = encode_payload(payload);
    let cipher = XChaCha20Poly1305::new_from_slice(&aead_key).map_err(|_| OnionError::Encrypt)?;
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_slice())
        .map_err(|_| OnionError::Encrypt)?;

    let mut out = Vec::with_capacity(1 + EPK_LEN + NONCE_LEN + ciphertext.len());
    out.push(VERSION);
    out.extend_from_slice(ephemeral_public.as_bytes());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt one onion layer using the recipient's 32-byte Ed25519 seed.
///
/// All failure modes — wrong key, tamper, truncation, cipher-internal
/// failure — collapse into `OnionError::Decrypt`; the reason is never
/// disclosed to the caller.
pub fn decrypt_layer(envelope: &[u8], recipient_seed: &[u8; 32]) -> Result<OnionPayload, OnionError> {
    if envelope.len() < MIN_LEN {
        return Err(OnionError::InvalidEnvelope);
    }
    if envelope[0] != VERSION {
        return Err(OnionError::UnsupportedVersion(envelope[0]));
    }

    let epk_bytes: [u8; 32] = envelope[1..33].try_into().unwrap();
    let nonce_bytes: [u8; 24] = envelope[33..57].try_into().unwrap();
    let ciphertext = &envelope[57..];

    let ephemeral_public = X25519Public::from(epk_bytes);
    let recipient_x25519 = ed25519_seed_to_x25519(recipient_seed);
    let shared = recipient_x25519.diffie_hellman(&ephemeral_public);
    let aead_key = derive_aead_key(shared.as_bytes(), &epk_bytes, HKDF_INFO);

    let cipher = XChaCha20Poly1305::new_from_slice(&aead_key).map_err(|_| OnionError::Decrypt)?;
    let nonce = XNonce::from_slice(&nonce_bytes);
    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| OnionError::Decrypt)?;

    decode_payload(&plaintext)
}
