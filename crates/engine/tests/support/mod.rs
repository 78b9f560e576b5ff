#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use common::{
    Error, KlineInterval, MarketDataClient, PriceSeries, Result, Symbol, SymbolInfo,
};
use engine::{Reporter, ScanSettings, Scanner};
use indicator::RsiIndicator;

/// Canned response for a series request.
#[derive(Debug, Clone)]
pub enum CannedSeries {
    Closes(Vec<f64>),
    HttpStatus(u16),
}

/// In-memory `MarketDataClient` that counts calls and tracks concurrency.
#[derive(Default)]
pub struct StubClient {
    series: HashMap<Symbol, CannedSeries>,
    prices: HashMap<Symbol, f64>,
    listing: Option<Vec<SymbolInfo>>,
    delay: Duration,
    pub listing_calls: AtomicUsize,
    pub series_calls: AtomicUsize,
    pub price_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub series_order: Mutex<Vec<Symbol>>,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: &str, closes: Vec<f64>) -> Self {
        self.series.insert(Symbol::new(symbol), CannedSeries::Closes(closes));
        self
    }

    pub fn with_series_status(mut self, symbol: &str, status: u16) -> Self {
        self.series.insert(Symbol::new(symbol), CannedSeries::HttpStatus(status));
        self
    }

    pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(Symbol::new(symbol), price);
        self
    }

    pub fn with_listing(mut self, listing: Vec<SymbolInfo>) -> Self {
        self.listing = Some(listing);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl MarketDataClient for StubClient {
    async fn list_symbols(&self) -> Result<Vec<SymbolInfo>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        self.listing
            .clone()
            .ok_or_else(|| Error::UniverseUnavailable("HTTP 503 Service Unavailable".into()))
    }

    async fn fetch_series(
        &self,
        symbol: &Symbol,
        _interval: KlineInterval,
        _limit: usize,
    ) -> Result<PriceSeries> {
        self.series_calls.fetch_add(1, Ordering::SeqCst);
        self.series_order.lock().unwrap().push(symbol.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.series.get(symbol) {
            Some(CannedSeries::Closes(closes)) => {
                Ok(PriceSeries::new(symbol.clone(), closes.clone()))
            }
            Some(CannedSeries::HttpStatus(status)) => {
                Err(Error::fetch_failed(symbol, format!("HTTP {status}")))
            }
            None => Err(Error::fetch_failed(symbol, "HTTP 400 Bad Request")),
        }
    }

    async fn fetch_spot_price(&self, symbol: &Symbol) -> Result<f64> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| Error::fetch_failed(symbol, "HTTP 404 Not Found"))
    }
}

/// `Write` sink whose contents tests can read back.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

pub fn falling(len: usize) -> Vec<f64> {
    (0..len).map(|i| 100.0 - i as f64).collect()
}

pub fn rising(len: usize) -> Vec<f64> {
    (0..len).map(|i| 100.0 + i as f64).collect()
}

pub fn settings(workers: usize) -> ScanSettings {
    ScanSettings {
        indicator: RsiIndicator::new(14, 30.0),
        interval: KlineInterval::OneMinute,
        limit: 1000,
        workers,
    }
}

pub fn scanner(client: Arc<StubClient>, workers: usize) -> (Scanner, SharedBuf) {
    let buf = SharedBuf::default();
    let reporter = Arc::new(Reporter::new(buf.clone()));
    (Scanner::new(client, reporter, settings(workers)), buf)
}

pub fn listing_record(symbol: &str, quote: &str, status: &str) -> SymbolInfo {
    SymbolInfo {
        symbol: symbol.to_string(),
        status: status.to_string(),
        base_asset: symbol.trim_end_matches(quote).to_string(),
        quote_asset: quote.to_string(),
    }
}
