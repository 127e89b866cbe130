//! Multi-layer packet builder (sender side).

use crate::error::OnionError;
use crate::layer::encrypt_layer;
use crate::payload::OnionPayload;
use crate::route::OnionHop;

/// Build a fully layered onion packet addressed to `hops[0]`.
///
/// Route: `hops[0] → hops[1] → ... → hops[N-1]`, delivering `op` to
/// `topic_id` at the last hop. The sender posts the returned bytes to
/// `hops[0].url`.
///
/// The `next_hop_url` carried inside hop *i*'s payload is always the URL of
/// hop *i+1*, never of *i* itself — hop *i*'s own URL is known out-of-band
/// to whoever sends to hop *i*.
pub fn build_onion_packet(
    hops: &[OnionHop],
    topic_id: &[u8; 32],
    op: &[u8],
) -> Result<Vec<u8>, OnionError> {
    if hops.is_empty() {
        return Err(OnionError::EmptyRoute);
    }

    let deliver = OnionPayload::Deliver {
        topic_id: *topic_id,
        op: op.to_vec(),
    };
    let mut current = encrypt_layer(&deliver, &hops[hops.len() - 1].verifying_key)?;

    for i in (0..hops.len() - 1).rev() {
        let forward = OnionPayload::Forward {
            next_hop_url: hops[i + 1].url.clone(),
            inner_packet: current,
        };
        current = encrypt_layer(&forward, &hops[i].verifying_key)?;
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::decrypt_layer;

    fn random_keypair() -> ([u8; 32], [u8; 32]) {
        use rand::RngCore;
        let mut seed = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut seed);
        let signing = ed25519_dalek::SigningKey::from_bytes(&seed);
        let verifying = signing.verifying_key();
        (seed, *verifying.as_bytes())
    }

    #[test]
    fn empty_route_returns_error() {
        let hops: Vec<OnionHop> = vec![];
        assert!(matches!(
            build_onion_packet(&hops, &[0u8; 32], b"msg"),
            Err(OnionError::EmptyRoute)
        ));
    }

    #[test]
    fn build_and_peel_single_hop() {
        let (hop1_seed, hop1_pk) = random_keypair();
        let tid = [0x42u8; 32];
        let op_bytes = b"hello from delta";

        let hops = vec![OnionHop::new(hop1_pk, "https://relay.example.com/hop")];

        let packet = build_onion_packet(&hops, &tid, op_bytes).unwrap();
        let payload = decrypt_layer(&packet, &hop1_seed).unwrap();

        match payload {
            OnionPayload::Deliver { topic_id, op } => {
                assert_eq!(topic_id, tid);
                assert_eq!(op, op_bytes);
            }
            _ => panic!("single-hop route should produce Deliver at hop 1"),
        }
    }

    /// S1 — literal scenario from the spec: three deterministic-seed hops,
    /// a fixed topic id and op, peeled one layer at a time.
    #[test]
    fn s1_three_hop_forward_and_deliver() {
        let hop1_seed = [0x01u8; 32];
        let hop2_seed = [0x02u8; 32];
        let hop3_seed = [0x03u8; 32];
        let hop1_pk = *ed25519_dalek::SigningKey::from_bytes(&hop1_seed)
            .verifying_key()
            .as_bytes();
        let hop2_pk = *ed25519_dalek::SigningKey::from_bytes(&hop2_seed)
            .verifying_key()
            .as_bytes();
        let hop3_pk = *ed25519_dalek::SigningKey::from_bytes(&hop3_seed)
            .verifying_key()
            .as_bytes();

        let tid = [0xaau8; 32];
        let op_bytes = b"hello";

        let hops = vec![
            OnionHop::new(hop1_pk, "https://h1/"),
            OnionHop::new(hop2_pk, "https://h2/"),
            OnionHop::new(hop3_pk, "https://h3/"),
        ];

        let packet = build_onion_packet(&hops, &tid, op_bytes).unwrap();

        let layer1 = decrypt_layer(&packet, &hop1_seed).unwrap();
        let inner1 = match layer1 {
            OnionPayload::Forward {
                next_hop_url,
                inner_packet,
            } => {
                assert_eq!(next_hop_url, "https://h2/");
                inner_packet
            }
            _ => panic!("hop1 should see Forward"),
        };

        let layer2 = decrypt_layer(&inner1, &hop2_seed).unwrap();
        let inner2 = match layer2 {
            OnionPayload::Forward {
                next_hop_url,
                inner_packet,
            } => {
                assert_eq!(next_hop_url, "https://h3/");
                inner_packet
            }
            _ => panic!("hop2 should see Forward"),
        };

        let layer3 = decrypt_layer(&inner2, &hop3_seed).unwrap();
        match layer3 {
            OnionPayload::Deliver { topic_id, op } => {
                assert_eq!(topic_id, tid);
                assert_eq!(op, op_bytes);
            }
            _ => panic!("hop3 should see Deliver"),
        }
    }

    /// S2 — single-hop route with an empty op.
    #[test]
    fn s2_empty_op_single_hop() {
        let (hop_seed, hop_pk) = random_keypair();
        let tid = [0u8; 32];

        let hops = vec![OnionHop::new(hop_pk, "https://relay.example.com/hop")];
        let packet = build_onion_packet(&hops, &tid, b"").unwrap();

        match decrypt_layer(&packet, &hop_seed).unwrap() {
            OnionPayload::Deliver { topic_id, op } => {
                assert_eq!(topic_id, tid);
                assert!(op.is_empty());
            }
            _ => panic!("expected Deliver"),
        }
    }

    /// S3 — a packet addressed to one hop must not decrypt under a different seed.
    #[test]
    fn s3_wrong_key_rejected() {
        let (_, hop_pk) = random_keypair();
        let (wrong_seed, _) = random_keypair();
        let tid = [0u8; 32];

        let hops = vec![OnionHop::new(hop_pk, "https://relay.example.com/hop")];
        let packet = build_onion_packet(&hops, &tid, b"secret").unwrap();

        assert!(matches!(
            decrypt_layer(&packet, &wrong_seed),
            Err(OnionError::Decrypt)
        ));
    }

    #[test]
    fn duplicate_hops_in_route_are_permitted() {
        let (seed, pk) = random_keypair();
        let tid = [0x7u8; 32];
        let hops = vec![
            OnionHop::new(pk, "https://relay.example.com/hop"),
            OnionHop::new(pk, "https://relay.example.com/hop"),
        ];
        let packet = build_onion_packet(&hops, &tid, b"dup").unwrap();

        // Peel twice with the same seed since both hops share an identity.
        let layer1 = decrypt_layer(&packet, &seed).unwrap();
        let inner1 = match layer1 {
            OnionPayload::Forward { inner_packet, .. } => inner_packet,
            _ => panic!("first layer should be Forward"),
        };
        let layer2 = decrypt_layer(&inner1, &seed).unwrap();
        assert!(matches!(layer2, OnionPayload::Deliver { .. }));
    }
}
