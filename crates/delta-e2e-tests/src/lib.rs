//! Harness for spinning up real `delta-relay` and `delta-sync` servers on
//! loopback, following the `start_test_server` / graceful-shutdown shape
//! used for node servers elsewhere in the pack.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

pub struct TestRelay {
    pub addr: SocketAddr,
    pub verifying_key: [u8; 32],
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestRelay {
    pub fn url(&self) -> String {
        format!("http://{}/hop", self.addr)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Start a relay bound to loopback `http`.
///
/// `allow_insecure_forward` controls whether this relay accepts an `http://`
/// forward target: chains of test relays need it set so they can forward to
/// each other over plain loopback http, while a relay under scheme-enforcement
/// test should leave it unset.
pub async fn start_test_relay(
    seed: [u8; 32],
    sync_deliver_url: String,
    allow_insecure_forward: bool,
) -> TestRelay {
    let state = Arc::new(if allow_insecure_forward {
        delta_relay::endpoint::RelayState::new_allow_insecure_forward(
            seed,
            Duration::from_secs(5),
            sync_deliver_url,
        )
    } else {
        delta_relay::endpoint::RelayState::new(seed, Duration::from_secs(5), sync_deliver_url)
    });
    let verifying_key: [u8; 32] = hex::decode(state.verifying_key_hex())
        .unwrap()
        .try_into()
        .unwrap();
    let app = delta_relay::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    TestRelay {
        addr,
        verifying_key,
        shutdown: Some(shutdown_tx),
    }
}

pub struct TestSync {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestSync {
    pub fn deliver_url(&self) -> String {
        format!("http://{}/deliver", self.addr)
    }

    pub fn ws_url(&self, topic_hex: &str, since: u64) -> String {
        format!("ws://{}/topic/{}?since={}", self.addr, topic_hex, since)
    }
}

impl Drop for TestSync {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn start_test_sync(buffer_size: usize) -> TestSync {
    let state = Arc::new(delta_sync::http::SyncState::new(buffer_size));
    let app = delta_sync::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    TestSync {
        addr,
        shutdown: Some(shutdown_tx),
    }
}
