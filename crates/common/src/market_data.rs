use async_trait::async_trait;

use crate::{KlineInterval, PriceSeries, Result, Symbol, SymbolInfo};

/// Abstraction over the remote market-data provider.
///
/// `BinanceClient` implements this against the public REST API. Scan tests
/// implement it with canned series so no network is involved.
///
/// Every call is a single attempt: no retry, no caching. Failures are
/// surfaced to the caller as `Error::FetchFailed` (or `UniverseUnavailable`
/// for the listing).
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Full symbol listing, unfiltered.
    async fn list_symbols(&self) -> Result<Vec<SymbolInfo>>;

    /// Closing prices for `symbol`, oldest first.
    async fn fetch_series(
        &self,
        symbol: &Symbol,
        interval: KlineInterval,
        limit: usize,
    ) -> Result<PriceSeries>;

    /// Latest traded price for `symbol`.
    async fn fetch_spot_price(&self, symbol: &Symbol) -> Result<f64>;
}
