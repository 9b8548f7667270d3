pub mod client;
pub mod rest;
pub mod types;

use crate::core::config::ClientConfig;
use crate::core::errors::CexioResult;

// Re-export main types for easier importing
pub use client::CexioClient;
pub use rest::{CexioRest, OK_SENTINEL};
pub use types::{Candle, CurrencyPair, Ohlcv, OpenPositionRequest};

/// Create a CEX.IO client on the reqwest transport.
///
/// Without a config, everything comes from the `CEXIO_*` environment.
pub fn build_client(config: Option<ClientConfig>) -> CexioResult<CexioClient> {
    let config = config.unwrap_or_else(ClientConfig::from_env);
    CexioClient::new(config)
}
