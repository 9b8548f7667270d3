use serde_json::Value;
use thiserror::Error;

/// Failure reported by a [`Transport`](crate::core::kernel::Transport).
///
/// Every variant is considered transient and is retried by
/// [`RetryingTransport`](crate::core::kernel::RetryingTransport).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum CexioError {
    #[error("Transport failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// The exchange answered, but reported a failure.
    #[error("Request rejected by exchange: {payload}")]
    Rejected { payload: Value },

    #[error("Response is missing field '{field}': {payload}")]
    MissingField { field: String, payload: Value },

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),
}

impl CexioError {
    pub fn missing_field(field: &str, payload: Value) -> Self {
        Self::MissingField {
            field: field.to_string(),
            payload,
        }
    }

    /// Raw payload returned by the exchange, if this error carries one.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Rejected { payload } | Self::MissingField { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

pub type CexioResult<T> = Result<T, CexioError>;
