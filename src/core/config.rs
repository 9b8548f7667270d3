use secrecy::{ExposeSecret, Secret};
use serde::{Serialize, Serializer};
use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://cex.io/api/";
pub const DEFAULT_CCY1: &str = "BTC";
pub const DEFAULT_CCY2: &str = "USD";

pub const ENV_CLIENT_ID: &str = "CEXIO_CLIENT_ID";
pub const ENV_KEY: &str = "CEXIO_KEY";
pub const ENV_SECRET: &str = "CEXIO_SECRET";
pub const ENV_CCY1: &str = "CEXIO_CCY_1";
pub const ENV_CCY2: &str = "CEXIO_CCY_2";

/// Bounded exponential backoff applied to transport failures.
///
/// The delay before retry `n` (1-based) is
/// `min(max_timeout, min_timeout * factor^(n - 1))`, and at most `retries`
/// retries follow the first attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub factor: f64,
    pub min_timeout: Duration,
    pub max_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            factor: 2.0,
            min_timeout: Duration::from_millis(1_000),
            max_timeout: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    /// Policy that performs a single attempt.
    #[must_use]
    pub fn none() -> Self {
        Self {
            retries: 0,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[must_use]
    pub fn factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    #[must_use]
    pub const fn min_timeout(mut self, min_timeout: Duration) -> Self {
        self.min_timeout = min_timeout;
        self
    }

    #[must_use]
    pub const fn max_timeout(mut self, max_timeout: Duration) -> Self {
        self.max_timeout = max_timeout;
        self
    }
}

/// Client settings, immutable once handed to a client.
///
/// Fields left unset are filled from `CEXIO_*` environment variables by
/// [`ClientConfig::resolve`]; explicitly set values always win.
#[derive(Clone)]
pub struct ClientConfig {
    client_id: Option<String>,
    api_key: Option<Secret<String>>,
    api_secret: Option<Secret<String>>,
    ccy1: Option<String>,
    ccy2: Option<String>,
    pub retry: RetryPolicy,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

// Never expose secrets in serialization
impl Serialize for ClientConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let redacted = |present: bool| present.then_some("[REDACTED]");

        let mut state = serializer.serialize_struct("ClientConfig", 8)?;
        state.serialize_field("client_id", &self.client_id)?;
        state.serialize_field("api_key", &redacted(self.api_key.is_some()))?;
        state.serialize_field("api_secret", &redacted(self.api_secret.is_some()))?;
        state.serialize_field("ccy1", self.ccy1())?;
        state.serialize_field("ccy2", self.ccy2())?;
        state.serialize_field("base_url", &self.base_url)?;
        state.serialize_field("timeout_seconds", &self.timeout_seconds)?;
        state.serialize_field("user_agent", &self.user_agent)?;
        state.end()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("has_credentials", &self.has_credentials())
            .field("ccy1", &self.ccy1())
            .field("ccy2", &self.ccy2())
            .field("retry", &self.retry)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfig {
    /// Create an empty configuration; nothing is read from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client_id: None,
            api_key: None,
            api_secret: None,
            ccy1: None,
            ccy2: None,
            retry: RetryPolicy::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
            user_agent: "cexio-rs/0.1".to_string(),
        }
    }

    /// Create configuration from environment variables
    ///
    /// Reads `CEXIO_CLIENT_ID`, `CEXIO_KEY`, `CEXIO_SECRET`, `CEXIO_CCY_1`
    /// and `CEXIO_CCY_2`. Missing credentials are reported by the first
    /// authenticated call, not here.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new().resolve()
    }

    /// Load a `.env` file (if it exists) and then read the environment.
    #[cfg(feature = "env-file")]
    pub fn from_env_file(env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // no file, fall back to the process environment
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Ok(Self::from_env())
    }

    /// Fill every unset field from the process environment.
    #[must_use]
    pub fn resolve(self) -> Self {
        self.resolve_with(|name| env::var(name).ok())
    }

    /// Fill every unset field using `lookup` as the variable source.
    #[must_use]
    pub fn resolve_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if self.client_id.is_none() {
            self.client_id = lookup(ENV_CLIENT_ID);
        }
        if self.api_key.is_none() {
            self.api_key = lookup(ENV_KEY).map(Secret::new);
        }
        if self.api_secret.is_none() {
            self.api_secret = lookup(ENV_SECRET).map(Secret::new);
        }
        if self.ccy1.is_none() {
            self.ccy1 = lookup(ENV_CCY1);
        }
        if self.ccy2.is_none() {
            self.ccy2 = lookup(ENV_CCY2);
        }
        self
    }

    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    #[must_use]
    pub fn api_secret(mut self, api_secret: impl Into<String>) -> Self {
        self.api_secret = Some(Secret::new(api_secret.into()));
        self
    }

    /// Set the default currency pair used when a call does not name one.
    #[must_use]
    pub fn currency_pair(mut self, ccy1: impl Into<String>, ccy2: impl Into<String>) -> Self {
        self.ccy1 = Some(ccy1.into());
        self.ccy2 = Some(ccy2.into());
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Primary currency of the default pair
    pub fn ccy1(&self) -> &str {
        self.ccy1.as_deref().unwrap_or(DEFAULT_CCY1)
    }

    /// Secondary currency of the default pair
    pub fn ccy2(&self) -> &str {
        self.ccy2.as_deref().unwrap_or(DEFAULT_CCY2)
    }

    /// Check if this configuration can sign requests
    pub fn has_credentials(&self) -> bool {
        self.client_id.is_some() && self.api_key.is_some() && self.api_secret.is_some()
    }

    pub fn get_client_id(&self) -> Result<&str, ConfigError> {
        self.client_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingCredential(ENV_CLIENT_ID.to_string()))
    }

    /// Get API key (use carefully - exposes secret)
    pub fn get_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret().as_str())
            .ok_or_else(|| ConfigError::MissingCredential(ENV_KEY.to_string()))
    }

    /// Get API secret (use carefully - exposes secret)
    pub fn get_api_secret(&self) -> Result<&str, ConfigError> {
        self.api_secret
            .as_ref()
            .map(|secret| secret.expose_secret().as_str())
            .ok_or_else(|| ConfigError::MissingCredential(ENV_SECRET.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing credential: {0} is not configured")]
    MissingCredential(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
