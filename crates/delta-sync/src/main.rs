use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use delta_sync::{config::SyncConfig, error::Result, error::SyncError, http};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "delta-sync", about = "Topic log and terminal delivery bridge for delta")]
struct Args {
    /// Path to the sync service's JSON config file.
    #[arg(long, default_value = "sync.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("delta_sync=info".parse().unwrap()))
        .init();

    let args = Args::parse();
    let config = SyncConfig::load_or_default(&args.config)?;

    let state = Arc::new(http::SyncState::new(config.buffer_size));
    let app = http::router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(SyncError::Bind)?;
    info!("sync service listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .await
        .expect("sync server crashed");

    Ok(())
}
