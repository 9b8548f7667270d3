use crate::core::config::ClientConfig;
use crate::core::errors::{CexioError, CexioResult};
use crate::core::kernel::{HmacSigner, ReqwestTransport, Signer, Transport};
use crate::exchanges::cexio::rest::{numeric_field, validate, validated, CexioRest};
use crate::exchanges::cexio::types::{Candle, CurrencyPair, Ohlcv, OpenPositionRequest};
use crate::utils::decimal::{format_decimal, Amount, DEFAULT_DECIMALS};
use crate::utils::normalize::normalize;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Client for the CEX.IO REST API.
///
/// Public endpoints need no credentials. Private endpoints sign every call
/// and fail with a configuration error when a credential is missing.
///
/// Methods taking `pair: Option<CurrencyPair>` fall back to the configured
/// default pair when `None` is given.
pub struct CexioClient<T: Transport = ReqwestTransport> {
    rest: CexioRest<T>,
    config: Arc<ClientConfig>,
}

impl CexioClient<ReqwestTransport> {
    /// Create a client on top of the reqwest transport.
    ///
    /// Unset configuration fields are filled from the `CEXIO_*` environment.
    pub fn new(config: ClientConfig) -> CexioResult<Self> {
        let config = config.resolve();
        let transport = ReqwestTransport::from_config(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> CexioClient<T> {
    /// Create a client on top of any transport, using `config` as given.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let signer = HmacSigner::from_config(&config)
            .ok()
            .map(|signer| Arc::new(signer) as Arc<dyn Signer>);
        Self::with_signer(config, transport, signer)
    }

    pub fn with_signer(
        config: ClientConfig,
        transport: T,
        signer: Option<Arc<dyn Signer>>,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            rest: CexioRest::new(transport, signer, config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn rest(&self) -> &CexioRest<T> {
        &self.rest
    }

    fn pair_path(&self, pair: Option<&CurrencyPair>) -> String {
        pair.map_or_else(
            || format!("{}/{}", self.config.ccy1(), self.config.ccy2()),
            CurrencyPair::path,
        )
    }

    // ========================================================================
    // Public Market Endpoints
    // ========================================================================

    /// Trading limits for every pair
    #[instrument(skip(self), fields(exchange = "cexio"))]
    pub async fn currency_limits(&self) -> CexioResult<Value> {
        let payload = self.rest.get("currency_limits", &[]).await?;
        Ok(normalize(payload))
    }

    #[instrument(skip(self), fields(exchange = "cexio"))]
    pub async fn ticker(&self, pair: Option<CurrencyPair>) -> CexioResult<Value> {
        let path = format!("ticker/{}", self.pair_path(pair.as_ref()));
        let payload = self.rest.get(&path, &[]).await?;
        Ok(normalize(payload))
    }

    /// Last traded price, taken from the `lprice` field
    #[instrument(skip(self), fields(exchange = "cexio"))]
    pub async fn last_price(&self, pair: Option<CurrencyPair>) -> CexioResult<f64> {
        let path = format!("last_price/{}", self.pair_path(pair.as_ref()));
        let payload = self.rest.get(&path, &[]).await?;
        numeric_field(&payload, "lprice")
    }

    /// Order book, optionally limited to `depth` levels per side
    #[instrument(skip(self), fields(exchange = "cexio"))]
    pub async fn order_book(
        &self,
        depth: Option<u32>,
        pair: Option<CurrencyPair>,
    ) -> CexioResult<Value> {
        let path = format!("order_book/{}", self.pair_path(pair.as_ref()));
        let query: Vec<(&str, String)> = depth
            .map(|depth| ("depth", depth.to_string()))
            .into_iter()
            .collect();

        let payload = self.rest.get(&path, &query).await?;
        Ok(normalize(payload))
    }

    /// Minute, hour and day candles for one calendar day
    #[instrument(skip(self), fields(exchange = "cexio"))]
    pub async fn ohlcv(&self, date: NaiveDate, pair: Option<CurrencyPair>) -> CexioResult<Ohlcv> {
        let path = format!(
            "ohlcv/hd/{}/{}",
            date.format("%Y%m%d"),
            self.pair_path(pair.as_ref())
        );
        let payload = validate(self.rest.get(&path, &[]).await?)?;

        let time = payload.get("time").cloned().unwrap_or(Value::Null);
        let data1m = parse_series(&payload, "data1m")?
            .ok_or_else(|| CexioError::missing_field("data1m", payload.clone()))?;

        Ok(Ohlcv {
            time,
            data1m,
            data1h: parse_series(&payload, "data1h")?,
            data1d: parse_series(&payload, "data1d")?,
        })
    }

    /// Convert `amount` of `ccy1` into `ccy2` at the current rate
    #[instrument(skip(self, amount), fields(exchange = "cexio"))]
    pub async fn convert(
        &self,
        amount: impl Into<Amount> + Send,
        pair: Option<CurrencyPair>,
    ) -> CexioResult<f64> {
        let path = format!("convert/{}", self.pair_path(pair.as_ref()));
        let params = vec![(
            "amnt".to_string(),
            format_decimal(amount, DEFAULT_DECIMALS),
        )];

        let payload = validate(self.rest.post_signed(&path, params).await?)?;
        numeric_field(&payload, "amnt")
    }

    /// Price history as `[{tmsp, price}]`
    #[instrument(skip(self), fields(exchange = "cexio"))]
    pub async fn price_stats(
        &self,
        last_hours: u32,
        max_resp_arr_size: u32,
        pair: Option<CurrencyPair>,
    ) -> CexioResult<Value> {
        let path = format!("price_stats/{}", self.pair_path(pair.as_ref()));
        let params = vec![
            ("lastHours".to_string(), last_hours.to_string()),
            ("maxRespArrSize".to_string(), max_resp_arr_size.to_string()),
        ];

        validated(self.rest.post_signed(&path, params).await?)
    }

    // ========================================================================
    // Private Account Endpoints
    // ========================================================================

    #[instrument(skip(self), fields(exchange = "cexio"))]
    pub async fn balance(&self) -> CexioResult<Value> {
        validated(self.rest.post_signed("balance/", Vec::new()).await?)
    }

    /// Open orders for `pair`, or across all pairs when `None`
    #[instrument(skip(self), fields(exchange = "cexio"))]
    pub async fn open_orders(&self, pair: Option<CurrencyPair>) -> CexioResult<Value> {
        let path = pair.map_or_else(
            || "open_orders".to_string(),
            |pair| format!("open_orders/{}", pair.path()),
        );

        validated(self.rest.post_signed(&path, Vec::new()).await?)
    }

    /// Status of the given orders
    #[instrument(skip(self), fields(exchange = "cexio"))]
    pub async fn active_orders_status(&self, order_ids: &[&str]) -> CexioResult<Value> {
        let params = order_ids
            .iter()
            .map(|id| ("orders_list[]".to_string(), (*id).to_string()))
            .collect();

        validated(
            self.rest
                .post_signed("active_orders_status", params)
                .await?,
        )
    }

    // ========================================================================
    // Private Margin Trading Endpoints
    // ========================================================================

    #[instrument(skip(self), fields(exchange = "cexio"))]
    pub async fn open_positions(&self, pair: Option<CurrencyPair>) -> CexioResult<Value> {
        let path = format!("open_positions/{}", self.pair_path(pair.as_ref()));
        validated(self.rest.post_signed(&path, Vec::new()).await?)
    }

    #[instrument(skip(self, position_id), fields(exchange = "cexio", position_id = %position_id))]
    pub async fn close_position(
        &self,
        position_id: &str,
        pair: Option<CurrencyPair>,
    ) -> CexioResult<Value> {
        let path = format!("close_position/{}", self.pair_path(pair.as_ref()));
        let params = vec![("id".to_string(), position_id.to_string())];

        validated(self.rest.post_signed(&path, params).await?)
    }

    #[instrument(skip(self), fields(exchange = "cexio"))]
    pub async fn open_position(
        &self,
        request: OpenPositionRequest,
        pair: Option<CurrencyPair>,
    ) -> CexioResult<Value> {
        let path = format!("open_position/{}", self.pair_path(pair.as_ref()));
        let params = request.to_params(self.config.ccy1());

        validated(self.rest.post_signed(&path, params).await?)
    }
}

impl<T: Transport> std::fmt::Debug for CexioClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CexioClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Decode a JSON-encoded candle series; `None` when the field is absent or null.
fn parse_series(payload: &Value, field: &str) -> CexioResult<Option<Vec<Candle>>> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(encoded)) => {
            let series = normalize(serde_json::from_str(encoded)?);
            Ok(Some(serde_json::from_value(series)?))
        }
        Some(other) => Ok(Some(serde_json::from_value(normalize(other.clone()))?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_series_decodes_embedded_json() {
        let payload = json!({
            "time": 20_160_228,
            "data1m": "[[1456617600,434.3867,434.3867,433.781,433.781,4.15450000]]",
            "data1h": null
        });

        let series = parse_series(&payload, "data1m").unwrap().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].len(), 6);
        assert!((series[0][0] - 1_456_617_600.0).abs() < f64::EPSILON);
        assert!((series[0][5] - 4.1545).abs() < 1e-9);

        assert!(parse_series(&payload, "data1h").unwrap().is_none());
        assert!(parse_series(&payload, "data1d").unwrap().is_none());
    }

    #[test]
    fn test_parse_series_rejects_garbage() {
        let payload = json!({"data1m": "not json"});
        assert!(matches!(
            parse_series(&payload, "data1m"),
            Err(CexioError::JsonError(_))
        ));
    }
}
