//! Sync service configuration, loaded from a JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SyncError};

fn default_buffer_size() -> usize {
    1000
}

fn default_listen_addr() -> String {
    "0.0.0.0:7000".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum number of entries retained per topic.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Address the HTTP/WebSocket server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            listen_addr: default_listen_addr(),
        }
    }
}

impl SyncConfig {
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(SyncError::ReadConfig)?;
            let config: SyncConfig =
                serde_json::from_str(&content).map_err(SyncError::ParseConfig)?;
            info!("loaded sync config from {:?}", path);
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from("sync.json")
    }
}
