use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use delta_relay::{config::RelayConfig, endpoint, error::Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "delta-relay", about = "Onion-routing relay hop for delta")]
struct Args {
    /// Path to the relay's JSON config file.
    #[arg(long, default_value = "relay.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("delta_relay=info".parse().unwrap()))
        .init();

    let args = Args::parse();
    let config = RelayConfig::load_or_generate(&args.config)?;

    let relay_seed = delta_onion::seed_from_hex(&config.relay_seed_hex)?;
    let state = Arc::new(endpoint::RelayState::new(
        relay_seed,
        Duration::from_secs(config.upstream_timeout_secs),
        config.sync_deliver_url.clone(),
    ));

    let verifying_key_hex = state.verifying_key_hex().to_string();
    let self_url = config.self_url.clone();
    let publish_seed = relay_seed;
    let publish_interval = config.directory_publish_interval_secs;
    tokio::spawn(async move {
        delta_relay::directory::start_republish_loop(
            publish_seed,
            self_url,
            verifying_key_hex,
            publish_interval,
        )
        .await;
    });

    let app = endpoint::router(state);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(delta_relay::error::RelayError::Bind)?;
    info!("relay listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .await
        .expect("relay server crashed");

    Ok(())
}
