use thiserror::Error;

/// Startup-time failures. Per-request failures never surface as this type —
/// they are mapped directly to status codes in the handler.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("failed to read config: {0}")]
    ReadConfig(std::io::Error),

    #[error("failed to parse config: {0}")]
    ParseConfig(serde_json::Error),

    #[error("failed to write config: {0}")]
    WriteConfig(std::io::Error),

    #[error("invalid relay seed: {0}")]
    InvalidSeed(#[from] delta_onion::OnionError),

    #[error("failed to bind listener: {0}")]
    Bind(std::io::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
