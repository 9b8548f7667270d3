/// Transport layer shared by every endpoint
///
/// The kernel contains no endpoint knowledge. It is organized around three
/// pieces:
///
/// ## Transport
/// - `Transport`: single-method capability that executes an `HttpRequest`
/// - `ReqwestTransport`: production adapter on top of reqwest
/// - `RetryingTransport`: bounded exponential backoff around any `Transport`
///
/// ## Authentication
/// - `Signer`: pluggable request signing
/// - `HmacSigner`: HMAC-SHA256 over `nonce ++ client_id ++ api_key`
///
/// # Example
/// ```rust,no_run
/// use cexio::core::config::RetryPolicy;
/// use cexio::core::kernel::*;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = RetryingTransport::new(
///     ReqwestTransport::new(30, "cexio-rs/0.1")?,
///     RetryPolicy::default(),
/// );
///
/// let ticker = transport
///     .send(&HttpRequest::get("https://cex.io/api/ticker/BTC/USD"))
///     .await?;
/// println!("{}", ticker);
/// # Ok(())
/// # }
/// ```
///
/// ## Test doubles
/// Anything implementing `Transport` can stand in for the network:
/// ```rust
/// use async_trait::async_trait;
/// use cexio::core::errors::TransportError;
/// use cexio::core::kernel::{HttpRequest, Transport};
/// use serde_json::{json, Value};
///
/// struct Canned;
///
/// #[async_trait]
/// impl Transport for Canned {
///     async fn execute(&self, _request: &HttpRequest) -> Result<Value, TransportError> {
///         Ok(json!({"lprice": "400.00"}))
///     }
/// }
/// ```
pub mod retry;
pub mod signer;
pub mod transport;

pub use retry::{Backoff, RetryingTransport};
pub use signer::{generate_nonce, HmacSigner, SignatureResult, Signer};
pub use transport::{HttpRequest, ReqwestTransport, ResponseFormat, Transport};
