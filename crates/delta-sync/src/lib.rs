//! Topic log, fan-out, and the terminal delivery bridge's HTTP surface.

pub mod config;
pub mod error;
pub mod http;
pub mod registry;
pub mod topic;

pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use http::{router, SyncState};
