//! The relay's two HTTP routes: `GET /pubkey`, `POST /hop`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use delta_onion::{decrypt_layer, OnionPayload};
use tracing::{debug, warn};

/// Shared, read-only relay state. The seed is held for the process lifetime
/// and never logged.
pub struct RelayState {
    relay_seed: [u8; 32],
    verifying_key_hex: String,
    http_client: reqwest::Client,
    sync_deliver_url: String,
    allow_insecure_forward: bool,
}

impl RelayState {
    pub fn new(relay_seed: [u8; 32], upstream_timeout: Duration, sync_deliver_url: String) -> Self {
        Self::with_forward_policy(relay_seed, upstream_timeout, sync_deliver_url, false)
    }

    /// Like [`RelayState::new`], but also accepts plain `http://` forward
    /// targets. Only the integration test harness should reach for this —
    /// a relay built with `new` always requires https on the wire.
    pub fn new_allow_insecure_forward(
        relay_seed: [u8; 32],
        upstream_timeout: Duration,
        sync_deliver_url: String,
    ) -> Self {
        Self::with_forward_policy(relay_seed, upstream_timeout, sync_deliver_url, true)
    }

    fn with_forward_policy(
        relay_seed: [u8; 32],
        upstream_timeout: Duration,
        sync_deliver_url: String,
        allow_insecure_forward: bool,
    ) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&relay_seed);
        let verifying_key_hex = hex::encode(signing_key.verifying_key().as_bytes());
        let http_client = reqwest::Client::builder()
            .timeout(upstream_timeout)
            .build()
            .expect("failed to build reqwest client");
        Self {
            relay_seed,
            verifying_key_hex,
            http_client,
            sync_deliver_url,
            allow_insecure_forward,
        }
    }

    pub fn verifying_key_hex(&self) -> &str {
        &self.verifying_key_hex
    }
}

pub fn router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/pubkey", get(get_pubkey))
        .route("/hop", post(post_hop))
        .with_state(state)
}

async fn get_pubkey(State(state): State<Arc<RelayState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        state.verifying_key_hex.clone(),
    )
}

async fn post_hop(State(state): State<Arc<RelayState>>, body: Bytes) -> StatusCode {
    if body.is_empty() {
        debug!("rejected empty hop body");
        return StatusCode::BAD_REQUEST;
    }

    let payload = match decrypt_layer(&body, &state.relay_seed) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "failed to decrypt hop envelope");
            return StatusCode::BAD_REQUEST;
        }
    };

    match payload {
        OnionPayload::Forward {
            next_hop_url,
            inner_packet,
        } => {
            let scheme_ok = next_hop_url.starts_with("https://")
                || (state.allow_insecure_forward && next_hop_url.starts_with("http://"));
            if !scheme_ok {
                warn!("forward target does not use an accepted scheme, rejecting");
                return StatusCode::BAD_REQUEST;
            }
            debug!("classified as forward");
            forward(&state.http_client, &next_hop_url, inner_packet).await
        }
        OnionPayload::Deliver { topic_id, op } => {
            debug!("classified as deliver, topic={}", hex::encode(topic_id));
            deliver(&state.http_client, &state.sync_deliver_url, &topic_id, &op).await
        }
    }
}

async fn forward(client: &reqwest::Client, url: &str, body: Vec<u8>) -> StatusCode {
    match client
        .post(url)
        .header("content-type", "application/octet-stream")
        .body(body)
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => StatusCode::OK,
        Ok(resp) => {
            warn!(status = %resp.status(), "upstream forward returned non-success");
            StatusCode::BAD_GATEWAY
        }
        Err(e) => {
            warn!(error = %e, "upstream forward request failed");
            StatusCode::BAD_GATEWAY
        }
    }
}

async fn deliver(
    client: &reqwest::Client,
    deliver_url: &str,
    topic_id: &[u8; 32],
    op: &[u8],
) -> StatusCode {
    use base64::Engine;
    let body = serde_json::json!({
        "topic_hex": hex::encode(topic_id),
        "op_base64": base64::engine::general_purpose::STANDARD.encode(op),
    });

    match client.post(deliver_url).json(&body).send().await {
        Ok(resp) if resp.status().is_success() => StatusCode::OK,
        Ok(resp) => {
            warn!(status = %resp.status(), "bridge delivery returned non-success");
            StatusCode::BAD_GATEWAY
        }
        Err(e) => {
            warn!(error = %e, "bridge delivery request failed");
            StatusCode::BAD_GATEWAY
        }
    }
}
