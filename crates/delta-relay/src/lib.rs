//! HTTP relay: peels one onion layer per request and forwards or delivers.

pub mod config;
pub mod directory;
pub mod endpoint;
pub mod error;

pub use config::RelayConfig;
pub use endpoint::{router, RelayState};
pub use error::{RelayError, Result};
