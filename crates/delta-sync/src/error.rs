use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("failed to read config: {0}")]
    ReadConfig(std::io::Error),

    #[error("failed to parse config: {0}")]
    ParseConfig(serde_json::Error),

    #[error("failed to write config: {0}")]
    WriteConfig(std::io::Error),

    #[error("failed to bind listener: {0}")]
    Bind(std::io::Error),

    #[error("topic actor is no longer running")]
    ActorGone,
}

pub type Result<T> = std::result::Result<T, SyncError>;
