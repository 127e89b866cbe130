//! Relay configuration, loaded from a JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RelayError, Result};

fn default_listen_addr() -> String {
    "0.0.0.0:8443".to_string()
}

fn default_directory_publish_interval_secs() -> u64 {
    3000
}

fn default_upstream_timeout_secs() -> u64 {
    30
}

fn default_sync_deliver_url() -> String {
    "http://127.0.0.1:7000/deliver".to_string()
}

/// On-disk configuration for one relay instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// 64-char hex encoded Ed25519 seed. Never logged.
    pub relay_seed_hex: String,

    /// This relay's public base URL, as published to the directory.
    pub self_url: String,

    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Interval, in seconds, between directory republish attempts.
    #[serde(default = "default_directory_publish_interval_secs")]
    pub directory_publish_interval_secs: u64,

    /// Timeout, in seconds, for the outgoing forward POST.
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// `POST` URL of the terminal delivery bridge's `/deliver` endpoint.
    #[serde(default = "default_sync_deliver_url")]
    pub sync_deliver_url: String,
}

impl RelayConfig {
    /// Load from `path`, falling back to generating a fresh seed and saving
    /// it back to `path` if the file does not exist.
    pub fn load_or_generate(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(RelayError::ReadConfig)?;
            let config: RelayConfig =
                serde_json::from_str(&content).map_err(RelayError::ParseConfig)?;
            info!("loaded relay config from {:?}", path);
            Ok(config)
        } else {
            use rand::RngCore;
            let mut seed = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed);
            let config = RelayConfig {
                relay_seed_hex: hex::encode(seed),
                self_url: "https://localhost:8443/hop".to_string(),
                listen_addr: default_listen_addr(),
                directory_publish_interval_secs: default_directory_publish_interval_secs(),
                upstream_timeout_secs: default_upstream_timeout_secs(),
                sync_deliver_url: default_sync_deliver_url(),
            };
            config.save_to(path)?;
            info!("generated new relay config at {:?}", path);
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(RelayError::WriteConfig)?;
            }
        }
        let content = serde_json::to_string_pretty(self).map_err(RelayError::ParseConfig)?;
        std::fs::write(path, content).map_err(RelayError::WriteConfig)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from("relay.json")
    }
}
