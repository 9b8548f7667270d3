use crate::core::config::{ClientConfig, ConfigError};
use crate::core::errors::TransportError;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, trace};

pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// How the response body is turned into a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    /// Raw body wrapped in `Value::String`
    Text,
}

/// A fully-formed HTTP exchange, ready to be executed by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
    pub format: ResponseFormat,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            format: ResponseFormat::Json,
        }
    }

    /// POST with a URL-encoded form body and matching content headers.
    pub fn post_form(url: impl Into<String>, body: String) -> Self {
        let headers = vec![
            ("Content-Type".to_string(), CONTENT_TYPE_FORM.to_string()),
            ("Content-Length".to_string(), body.len().to_string()),
        ];

        Self {
            method: Method::POST,
            url: url.into(),
            headers,
            query: Vec::new(),
            body: Some(body),
            format: ResponseFormat::Json,
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decode the form body back into its fields, in wire order.
    ///
    /// A request without a body has no fields.
    pub fn form_fields(&self) -> Result<Vec<(String, String)>, TransportError> {
        match self.body.as_deref() {
            Some(body) => serde_urlencoded::from_str(body)
                .map_err(|e| TransportError::Decode(format!("Invalid form body: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    /// First form field named `key`; `None` when absent or the body does not decode.
    pub fn form_field(&self, key: &str) -> Option<String> {
        self.form_fields()
            .ok()?
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// Capability that performs one HTTP exchange and decodes its body.
///
/// The production adapter is [`ReqwestTransport`]; tests substitute their own.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &HttpRequest) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: &HttpRequest) -> Result<Value, TransportError> {
        (**self).execute(request).await
    }
}

/// Implementation of `Transport` using reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout_seconds: u64, user_agent: &str) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                ConfigError::InvalidConfiguration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::new(config.timeout_seconds, &config.user_agent)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: &HttpRequest) -> Result<Value, TransportError> {
        let mut builder = self.client.request(request.method.clone(), &request.url);

        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        debug!("Sending request");
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("Request failed: {}", e)))?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            TransportError::Network(format!("Failed to read response body: {}", e))
        })?;

        trace!(status = %status, "Response body: {}", response_text);

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: response_text,
            });
        }

        match request.format {
            ResponseFormat::Json => serde_json::from_str(&response_text).map_err(|e| {
                TransportError::Decode(format!("Failed to parse JSON response: {}", e))
            }),
            ResponseFormat::Text => Ok(Value::String(response_text)),
        }
    }
}
