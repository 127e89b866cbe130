//! Inner payload codec — the plaintext tagged union carried inside one
//! onion layer once its ciphertext has been authenticated.
//!
//! ```text
//! Forward: TYPE[1]=0x01 | url_len:u16 (BE) | url_bytes | inner_packet
//! Deliver: TYPE[1]=0x02 | topic_id[32]    | op
//! ```

use crate::error::OnionError;

/// Decoded onion payload after peeling one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnionPayload {
    /// This hop should forward `inner_packet` to `next_hop_url`.
    Forward {
        next_hop_url: String,
        inner_packet: Vec<u8>,
    },
    /// This hop is the exit — deliver `op` to the topic `topic_id`.
    Deliver {
        topic_id: [u8; 32],
        op: Vec<u8>,
    },
}

const FORWARD_TAG: u8 = 0x01;
const DELIVER_TAG: u8 = 0x02;

pub fn encode_payload(p: &OnionPayload) -> Vec<u8> {
    match p {
        OnionPayload::Forward {
            next_hop_url,
            inner_packet,
        } => {
            let url_bytes = next_hop_url.as_bytes();
            let url_len = url_bytes.len() as u16;
            let mut out = Vec::with_capacity(3 + url_bytes.len() + inner_packet.len());
            out.push(FORWARD_TAG);
            out.extend_from_slice(&url_len.to_be_bytes());
            out.extend_from_slice(url_bytes);
            out.extend_from_slice(inner_packet);
            out
        }
        OnionPayload::Deliver { topic_id, op } => {
            let mut out = Vec::with_capacity(1 + 32 + op.len());
            out.push(DELIVER_TAG);
            out.extend_from_slice(topic_id);
            out.extend_from_slice(op);
            out
        }
    }
}

pub fn decode_payload(bytes: &[u8]) -> Result<OnionPayload, OnionError> {
    if bytes.is_empty() {
        return Err(OnionError::InvalidPayload);
    }
    match bytes[0] {
        FORWARD_TAG => {
            if bytes.len() < 3 {
                return Err(OnionError::InvalidPayload);
            }
            let url_len = u16::from_be_bytes([bytes[1], bytes[2]]) as usize;
            if bytes.len() < 3 + url_len {
                return Err(OnionError::InvalidPayload);
            }
            let next_hop_url = String::from_utf8(bytes[3..3 + url_len].to_vec())
                .map_err(|_| OnionError::InvalidPayload)?;
            let inner_packet = bytes[3 + url_len..].to_vec();
            Ok(OnionPayload::Forward {
                next_hop_url,
                inner_packet,
            })
        }
        DELIVER_TAG => {
            if bytes.len() < 1 + 32 {
                return Err(OnionError::InvalidPayload);
            }
            let mut topic_id = [0u8; 32];
            topic_id.copy_from_slice(&bytes[1..33]);
            let op = bytes[33..].to_vec();
            Ok(OnionPayload::Deliver { topic_id, op })
        }
        _ => Err(OnionError::InvalidPayload),
    }
}
