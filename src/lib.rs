pub mod core;
pub mod exchanges;
pub mod utils;

pub use crate::core::{
    config::{ClientConfig, RetryPolicy},
    errors::{CexioError, CexioResult, TransportError},
};
pub use exchanges::cexio::{build_client, CexioClient, CurrencyPair, Ohlcv, OpenPositionRequest};
pub use utils::{
    decimal::{format_decimal, Amount},
    normalize::normalize,
};
