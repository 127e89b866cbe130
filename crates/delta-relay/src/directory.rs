//! Publish this relay's identity to the external pkarr directory so senders
//! can resolve `verifying_key -> https URL` out-of-band.
//!
//! Record shape and publish mechanism mirror the teacher's profile
//! publishing: `v=delta1;t=relay;n=<self_url>;a=<verifying_key_hex>` as a
//! single signed TXT record under `_delta`.

use std::time::Duration;

use pkarr::Keypair;
use tokio::time::interval;
use tracing::{info, warn};

const DNS_TTL: u32 = 7200;

fn build_relay_txt_record(self_url: &str, verifying_key_hex: &str) -> String {
    format!("v=delta1;t=relay;n={self_url};a={verifying_key_hex}")
}

/// Publish once. Fire-and-forget: a failure here does not affect request
/// handling, only discoverability.
pub async fn publish_relay_record(
    relay_seed: &[u8; 32],
    self_url: &str,
    verifying_key_hex: &str,
) -> Result<(), String> {
    let keypair = Keypair::from_secret_key(relay_seed);
    let txt_value = build_relay_txt_record(self_url, verifying_key_hex);

    let txt = pkarr::dns::rdata::TXT::try_from(txt_value.as_str())
        .map_err(|e| format!("invalid txt: {e}"))?;
    let name = pkarr::dns::Name::new("_delta").map_err(|e| format!("invalid name: {e}"))?;
    let signed_packet = pkarr::SignedPacket::builder()
        .txt(name, txt, DNS_TTL)
        .sign(&keypair)
        .map_err(|e| format!("failed to sign packet: {e}"))?;

    let client = pkarr::Client::builder()
        .build()
        .map_err(|e| format!("failed to create pkarr client: {e}"))?;

    client
        .publish(&signed_packet, None)
        .await
        .map_err(|e| format!("publish failed: {e}"))
}

/// Background loop: republish on a fixed interval until the process exits.
pub async fn start_republish_loop(relay_seed: [u8; 32], self_url: String, verifying_key_hex: String, interval_secs: u64) {
    let mut ticker = interval(Duration::from_secs(interval_secs));
    loop {
        ticker.tick().await;
        match publish_relay_record(&relay_seed, &self_url, &verifying_key_hex).await {
            Ok(()) => info!("republished relay directory record"),
            Err(e) => warn!(error = %e, "directory republish failed"),
        }
    }
}
