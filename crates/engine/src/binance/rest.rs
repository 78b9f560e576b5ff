use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use common::{
    Error, KlineInterval, MarketDataClient, PriceSeries, Result, Symbol, SymbolInfo,
};

const EXCHANGE_INFO_PATH: &str = "/api/v3/exchangeInfo";
const KLINES_PATH: &str = "/api/v3/klines";
const PRICE_PATH: &str = "/api/v3/ticker/price";

/// Position of the close price inside a Binance kline row.
const KLINE_CLOSE_INDEX: usize = 4;

/// Public REST API client for Binance market data. Unsigned endpoints only.
pub struct BinanceClient {
    base_url: String,
    http: Client,
    /// Series shorter than this are rejected as `InsufficientData`.
    min_series_len: usize,
}

impl BinanceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            min_series_len: 0,
        })
    }

    /// Reject series shorter than `len` closes at fetch time.
    pub fn with_min_series_len(mut self, len: usize) -> Self {
        self.min_series_len = len;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` with `query`, returning the decoded body or a
    /// description of what went wrong.
    async fn public_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<T, String> {
        let url = format!("{}{path}", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| transport_cause(&e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_cause(status, &body));
        }

        let body = resp.text().await.map_err(|e| transport_cause(&e))?;
        serde_json::from_str(&body).map_err(|e| format!("malformed response: {e}"))
    }
}

#[async_trait]
impl MarketDataClient for BinanceClient {
    async fn list_symbols(&self) -> Result<Vec<SymbolInfo>> {
        debug!("Requesting exchange symbol listing");
        let info: ExchangeInfo = self
            .public_get(EXCHANGE_INFO_PATH, &[])
            .await
            .map_err(Error::UniverseUnavailable)?;
        Ok(info.symbols)
    }

    async fn fetch_series(
        &self,
        symbol: &Symbol,
        interval: KlineInterval,
        limit: usize,
    ) -> Result<PriceSeries> {
        let limit = limit.to_string();
        let rows: Vec<Vec<serde_json::Value>> = self
            .public_get(
                KLINES_PATH,
                &[
                    ("symbol", symbol.as_str()),
                    ("interval", interval.as_str()),
                    ("limit", limit.as_str()),
                ],
            )
            .await
            .map_err(|cause| Error::fetch_failed(symbol, cause))?;

        let closes = rows
            .iter()
            .map(|row| close_price(row))
            .collect::<std::result::Result<Vec<f64>, String>>()
            .map_err(|cause| Error::fetch_failed(symbol, cause))?;

        if closes.len() < self.min_series_len {
            return Err(Error::InsufficientData {
                got: closes.len(),
                period: self.min_series_len,
            });
        }

        debug!(symbol = %symbol, closes = closes.len(), "Fetched kline series");
        Ok(PriceSeries::new(symbol.clone(), closes))
    }

    async fn fetch_spot_price(&self, symbol: &Symbol) -> Result<f64> {
        let ticker: PriceTicker = self
            .public_get(PRICE_PATH, &[("symbol", symbol.as_str())])
            .await
            .map_err(|cause| Error::fetch_failed(symbol, cause))?;

        parse_price(&ticker.price).map_err(|cause| Error::fetch_failed(symbol, cause))
    }
}

fn transport_cause(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else {
        format!("transport error: {e}")
    }
}

fn status_cause(status: StatusCode, body: &str) -> String {
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {body}")
    }
}

fn close_price(row: &[serde_json::Value]) -> std::result::Result<f64, String> {
    match row.get(KLINE_CLOSE_INDEX) {
        Some(serde_json::Value::String(s)) => parse_price(s),
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| format!("close price out of range: {n}")),
        other => Err(format!("kline row has no close price: {other:?}")),
    }
}

fn parse_price(raw: &str) -> std::result::Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("invalid price '{raw}'")),
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Deserialize)]
struct PriceTicker {
    price: String,
}
