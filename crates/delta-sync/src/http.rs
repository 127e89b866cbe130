//! HTTP + WebSocket surface: `POST /deliver` (terminal delivery bridge) and
//! `GET /topic/{topic_hex}` (replay + live subscription).

use std::sync::{Arc, OnceLock};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::registry::TopicRegistry;
use crate::topic::{TopicCommand, TopicEvent};

pub struct SyncState {
    pub registry: TopicRegistry,
}

impl SyncState {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            registry: TopicRegistry::new(buffer_size),
        }
    }
}

fn topic_hex_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[0-9a-f]{64}$").unwrap())
}

pub fn router(state: Arc<SyncState>) -> Router {
    Router::new()
        .route("/deliver", post(post_deliver))
        .route("/topic/{topic_hex}", get(get_topic))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct DeliverRequest {
    topic_hex: String,
    op_base64: String,
}

fn parse_topic_hex(topic_hex: &str) -> Option<[u8; 32]> {
    if !topic_hex_re().is_match(topic_hex) {
        return None;
    }
    hex::decode(topic_hex).ok()?.try_into().ok()
}

async fn post_deliver(
    State(state): State<Arc<SyncState>>,
    Json(req): Json<DeliverRequest>,
) -> StatusCode {
    let Some(topic_id) = parse_topic_hex(&req.topic_hex) else {
        return StatusCode::BAD_REQUEST;
    };
    let Ok(op) = base64::engine::general_purpose::STANDARD.decode(&req.op_base64) else {
        return StatusCode::BAD_REQUEST;
    };

    let sender = state.registry.get_or_spawn(topic_id);
    let (reply_tx, reply_rx) = oneshot::channel();
    if sender
        .send(TopicCommand::Append {
            op,
            reply: reply_tx,
        })
        .await
        .is_err()
    {
        warn!("topic actor unreachable on deliver");
        return StatusCode::BAD_GATEWAY;
    }

    match reply_rx.await {
        Ok(seq) => {
            debug!(seq, topic = %req.topic_hex, "delivered op");
            StatusCode::OK
        }
        Err(_) => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Debug, Deserialize)]
struct SinceQuery {
    #[serde(default)]
    since: u64,
}

async fn get_topic(
    State(state): State<Arc<SyncState>>,
    Path(topic_hex): Path<String>,
    Query(query): Query<SinceQuery>,
    ws: WebSocketUpgrade,
) -> axum::response::Response {
    let Some(topic_id) = parse_topic_hex(&topic_hex) else {
        return (StatusCode::BAD_REQUEST, "invalid topic id").into_response();
    };

    let sender = state.registry.get_or_spawn(topic_id);
    ws.on_upgrade(move |socket| handle_socket(socket, sender, query.since))
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum WireEvent<'a> {
    #[serde(rename = "op")]
    Op { seq: u64, data: &'a str },
    #[serde(rename = "ready")]
    Ready { head: u64 },
}

#[derive(Debug, Deserialize)]
struct ClientOpMessage {
    #[serde(rename = "type")]
    kind: String,
    data: String,
}

async fn handle_socket(
    mut socket: WebSocket,
    topic: tokio::sync::mpsc::Sender<TopicCommand>,
    since: u64,
) {
    let (reply_tx, reply_rx) = oneshot::channel();
    if topic
        .send(TopicCommand::Subscribe {
            since,
            reply: reply_tx,
        })
        .await
        .is_err()
    {
        return;
    }
    let Ok(mut events) = reply_rx.await else {
        return;
    };

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let encoded = match &event {
                    TopicEvent::Op { seq, op } => {
                        let data = base64::engine::general_purpose::STANDARD.encode(op);
                        serde_json::to_string(&WireEvent::Op { seq: *seq, data: &data })
                    }
                    TopicEvent::Ready { head } => {
                        serde_json::to_string(&WireEvent::Ready { head: *head })
                    }
                };
                let Ok(text) = encoded else { continue };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                let Some(Ok(msg)) = incoming else { break };
                if let Message::Text(text) = msg {
                    handle_client_message(&text, &topic).await;
                }
            }
        }
    }
}

/// Parse and apply a client-injected op. Any malformed message is silently
/// ignored, per the wire contract.
async fn handle_client_message(text: &str, topic: &tokio::sync::mpsc::Sender<TopicCommand>) {
    let Ok(parsed) = serde_json::from_str::<ClientOpMessage>(text) else {
        return;
    };
    if parsed.kind != "op" {
        return;
    }
    let Ok(op) = base64::engine::general_purpose::STANDARD.decode(&parsed.data) else {
        return;
    };
    let (reply_tx, _reply_rx) = oneshot::channel();
    let _ = topic
        .send(TopicCommand::Append {
            op,
            reply: reply_tx,
        })
        .await;
}
