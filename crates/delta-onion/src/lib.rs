//! Sender-anonymous layered encryption for onion-routed delta operations.
//!
//! A route is an ordered list of [`OnionHop`]s. [`build_onion_packet`]
//! wraps an operation in one AEAD layer per hop, outermost first; each hop
//! calls [`decrypt_layer`] with its own seed to learn either where to
//! forward next ([`OnionPayload::Forward`]) or what to deliver locally
//! ([`OnionPayload::Deliver`]).

mod builder;
mod crypto;
mod error;
mod layer;
mod payload;
mod route;

pub use builder::build_onion_packet;
pub use crypto::{derive_aead_key, ed25519_pubkey_to_x25519, ed25519_seed_to_x25519};
pub use error::OnionError;
pub use layer::{decrypt_layer, encrypt_layer};
pub use payload::{decode_payload, encode_payload, OnionPayload};
pub use route::{seed_from_hex, OnionHop};
