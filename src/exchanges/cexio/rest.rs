use crate::core::config::ClientConfig;
use crate::core::errors::{CexioError, CexioResult};
use crate::core::kernel::{generate_nonce, HttpRequest, RetryingTransport, Signer, Transport};
use crate::utils::normalize::normalize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Success sentinel carried in the `ok` field of many responses
pub const OK_SENTINEL: &str = "ok";

/// Request plumbing for the CEX.IO API: URL assembly, signing and retries.
pub struct CexioRest<T: Transport> {
    base_url: String,
    transport: RetryingTransport<T>,
    signer: Option<Arc<dyn Signer>>,
    config: Arc<ClientConfig>,
}

impl<T: Transport> CexioRest<T> {
    pub fn new(transport: T, signer: Option<Arc<dyn Signer>>, config: Arc<ClientConfig>) -> Self {
        Self {
            base_url: config.base_url.clone(),
            transport: RetryingTransport::new(transport, config.retry.clone()),
            signer,
            config,
        }
    }

    pub fn transport(&self) -> &RetryingTransport<T> {
        &self.transport
    }

    /// Build the full URL for an endpoint
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn signer(&self) -> CexioResult<&dyn Signer> {
        if let Some(signer) = &self.signer {
            return Ok(signer.as_ref());
        }

        // name the credential that is missing
        self.config.get_client_id()?;
        self.config.get_api_key()?;
        self.config.get_api_secret()?;
        Err(CexioError::AuthError(
            "Authentication required but no signer provided".to_string(),
        ))
    }

    /// Unsigned GET; returns the decoded payload as received.
    #[instrument(skip(self, query), fields(exchange = "cexio", path = %path))]
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> CexioResult<Value> {
        let mut request = HttpRequest::get(self.build_url(path));
        for (key, value) in query {
            request = request.with_query(key, value);
        }

        debug!("Public request");
        self.transport.send(&request).await
    }

    /// Signed form POST; returns the decoded payload as received.
    ///
    /// The nonce is generated once here, so every retry replays the same body.
    #[instrument(skip(self, params), fields(exchange = "cexio", path = %path))]
    pub async fn post_signed(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> CexioResult<Value> {
        let request = self.signed_request(path, &params, generate_nonce()?)?;

        debug!(nonce = ?request.form_field("nonce"), "Private request");
        self.transport.send(&request).await
    }

    /// Assemble the signed POST for `path` using an explicit nonce.
    pub fn signed_request(
        &self,
        path: &str,
        params: &[(String, String)],
        nonce: u64,
    ) -> CexioResult<HttpRequest> {
        let signed = self.signer()?.sign_request(params, nonce)?;
        let body = serde_urlencoded::to_string(&signed).map_err(|e| {
            CexioError::InvalidParameters(format!("Failed to encode request body: {}", e))
        })?;

        Ok(HttpRequest::post_form(self.build_url(path), body))
    }
}

/// Reject missing payloads, `ok` values other than the success sentinel,
/// and payloads carrying an `error` field.
pub fn validate(payload: Value) -> CexioResult<Value> {
    let rejected = match &payload {
        Value::Null => true,
        Value::Object(map) => {
            map.contains_key("error")
                || map
                    .get("ok")
                    .is_some_and(|ok| ok.as_str() != Some(OK_SENTINEL))
        }
        _ => false,
    };

    if rejected {
        return Err(CexioError::Rejected { payload });
    }
    Ok(payload)
}

/// Validate, then normalize numeric strings.
pub fn validated(payload: Value) -> CexioResult<Value> {
    validate(payload).map(normalize)
}

/// Extract `field` from `payload` as a number, failing if absent or non-numeric.
pub fn numeric_field(payload: &Value, field: &str) -> CexioResult<f64> {
    payload
        .get(field)
        .cloned()
        .map(normalize)
        .and_then(|value| value.as_f64())
        .ok_or_else(|| CexioError::missing_field(field, payload.clone()))
}
