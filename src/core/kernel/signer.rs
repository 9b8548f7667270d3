use crate::core::config::{ClientConfig, ConfigError};
use crate::core::errors::{CexioError, CexioResult};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Result type for signing operations: the complete signed parameter list
pub type SignatureResult = CexioResult<Vec<(String, String)>>;

/// Parameter names owned by the signer; callers cannot override them.
pub const RESERVED_PARAMS: [&str; 3] = ["nonce", "key", "signature"];

/// Signer trait for request authentication
pub trait Signer: Send + Sync {
    /// Produce the signed parameter set for one request.
    ///
    /// # Arguments
    /// * `params` - Endpoint-specific parameters, in wire order
    /// * `nonce` - Request nonce in milliseconds since the epoch
    fn sign_request(&self, params: &[(String, String)], nonce: u64) -> SignatureResult;
}

/// HMAC-SHA256 signer for the CEX.IO private API.
///
/// The signed message is `nonce ++ client_id ++ api_key`; the signature is
/// the upper-case hex digest keyed with the API secret.
pub struct HmacSigner {
    client_id: String,
    api_key: String,
    api_secret: Secret<String>,
}

impl HmacSigner {
    pub fn new(client_id: String, api_key: String, api_secret: String) -> Self {
        Self {
            client_id,
            api_key,
            api_secret: Secret::new(api_secret),
        }
    }

    /// Build a signer from resolved configuration, naming the first missing credential.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.get_client_id()?.to_string(),
            config.get_api_key()?.to_string(),
            config.get_api_secret()?.to_string(),
        ))
    }

    pub fn generate_signature(&self, nonce: u64) -> CexioResult<String> {
        let message = format!("{}{}{}", nonce, self.client_id, self.api_key);

        let mut mac = HmacSha256::new_from_slice(self.api_secret.expose_secret().as_bytes())
            .map_err(|e| CexioError::AuthError(format!("Failed to create HMAC: {}", e)))?;
        mac.update(message.as_bytes());

        Ok(hex::encode_upper(mac.finalize().into_bytes()))
    }
}

impl Signer for HmacSigner {
    fn sign_request(&self, params: &[(String, String)], nonce: u64) -> SignatureResult {
        let mut signed = Vec::with_capacity(params.len() + 3);
        signed.push(("nonce".to_string(), nonce.to_string()));
        signed.push(("key".to_string(), self.api_key.clone()));

        signed.extend(
            params
                .iter()
                .filter(|(name, _)| !RESERVED_PARAMS.contains(&name.as_str()))
                .cloned(),
        );

        signed.push(("signature".to_string(), self.generate_signature(nonce)?));
        Ok(signed)
    }
}

/// Current wall-clock time in milliseconds, used as the request nonce
pub fn generate_nonce() -> CexioResult<u64> {
    nonce_at(SystemTime::now())
}

fn nonce_at(now: SystemTime) -> CexioResult<u64> {
    now.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| {
            ConfigError::InvalidConfiguration(format!("System clock is before the Unix epoch: {}", e))
                .into()
        })
}
