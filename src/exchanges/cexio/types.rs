use crate::utils::decimal::{format_decimal, Amount, DEFAULT_DECIMALS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Two-symbol market identifier, e.g. `BTC/EUR`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub ccy1: String,
    pub ccy2: String,
}

impl CurrencyPair {
    pub fn new(ccy1: impl Into<String>, ccy2: impl Into<String>) -> Self {
        Self {
            ccy1: ccy1.into(),
            ccy2: ccy2.into(),
        }
    }

    /// `{ccy1}/{ccy2}` as used in endpoint paths
    pub fn path(&self) -> String {
        format!("{}/{}", self.ccy1, self.ccy2)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ccy1, self.ccy2)
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for CurrencyPair {
    fn from((ccy1, ccy2): (A, B)) -> Self {
        Self::new(ccy1, ccy2)
    }
}

/// Parameters for opening a margin position.
///
/// `symbol` and `msymbol` default to the client's primary currency.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPositionRequest {
    pub amount: Amount,
    pub ptype: String,
    pub leverage: u32,
    pub eoprice: Amount,
    pub stop_loss_price: Option<Amount>,
    pub any_slippage: bool,
    pub symbol: Option<String>,
    pub msymbol: Option<String>,
}

impl OpenPositionRequest {
    pub fn new(
        amount: impl Into<Amount>,
        ptype: impl Into<String>,
        leverage: u32,
        eoprice: impl Into<Amount>,
    ) -> Self {
        Self {
            amount: amount.into(),
            ptype: ptype.into(),
            leverage,
            eoprice: eoprice.into(),
            stop_loss_price: None,
            any_slippage: true,
            symbol: None,
            msymbol: None,
        }
    }

    #[must_use]
    pub fn stop_loss_price(mut self, price: impl Into<Amount>) -> Self {
        self.stop_loss_price = Some(price.into());
        self
    }

    #[must_use]
    pub fn any_slippage(mut self, any_slippage: bool) -> Self {
        self.any_slippage = any_slippage;
        self
    }

    #[must_use]
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn msymbol(mut self, msymbol: impl Into<String>) -> Self {
        self.msymbol = Some(msymbol.into());
        self
    }

    /// Form fields in wire order; `default_symbol` fills `symbol`/`msymbol`.
    pub fn to_params(&self, default_symbol: &str) -> Vec<(String, String)> {
        let symbol = self.symbol.as_deref().unwrap_or(default_symbol);
        let msymbol = self.msymbol.as_deref().unwrap_or(default_symbol);

        let mut params = vec![
            (
                "amount".to_string(),
                format_decimal(self.amount.clone(), DEFAULT_DECIMALS),
            ),
            ("symbol".to_string(), symbol.to_string()),
            ("leverage".to_string(), self.leverage.to_string()),
            ("ptype".to_string(), self.ptype.to_lowercase()),
            ("anySlippage".to_string(), self.any_slippage.to_string()),
            (
                "eoprice".to_string(),
                format_decimal(self.eoprice.clone(), DEFAULT_DECIMALS),
            ),
        ];

        if let Some(stop_loss) = &self.stop_loss_price {
            params.push((
                "stopLossPrice".to_string(),
                format_decimal(stop_loss.clone(), DEFAULT_DECIMALS),
            ));
        }

        params.push(("msymbol".to_string(), msymbol.to_string()));
        params
    }
}

/// One candle: `[timestamp, open, high, low, close, volume]`
pub type Candle = Vec<f64>;

/// Historical OHLCV for one day.
///
/// The exchange ships each series as a JSON-encoded string; they are
/// decoded here. `time` is passed through as received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ohlcv {
    pub time: Value,
    pub data1m: Vec<Candle>,
    pub data1h: Option<Vec<Candle>>,
    pub data1d: Option<Vec<Candle>>,
}
