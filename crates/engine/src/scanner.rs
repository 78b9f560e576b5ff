use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use common::{
    Config, Error, KlineInterval, MarketDataClient, ScanResult, ScanSummary, ScanTarget, Symbol,
};
use indicator::RsiIndicator;

use crate::report::Reporter;
use crate::universe::UniverseProvider;

type SymbolQueue = Arc<Mutex<mpsc::UnboundedReceiver<Symbol>>>;

/// Fixed request and indicator parameters for every symbol in a pass.
#[derive(Debug, Clone, Copy)]
pub struct ScanSettings {
    pub indicator: RsiIndicator,
    pub interval: KlineInterval,
    /// Klines requested per symbol.
    pub limit: usize,
    /// Maximum concurrent in-flight symbols.
    pub workers: usize,
}

impl ScanSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            indicator: RsiIndicator::new(cfg.rsi_period, cfg.rsi_threshold),
            interval: cfg.interval,
            limit: cfg.kline_limit,
            workers: cfg.max_workers,
        }
    }
}

/// Terminal state of one symbol within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolOutcome {
    Reported,
    AboveThreshold,
    InsufficientData,
    Failed,
}

/// Drives `fetch series → compute RSI → fetch price → report` over a set of
/// symbols with at most `workers` symbols in flight.
///
/// Per-symbol failures are logged and counted; they never abort the pass.
#[derive(Clone)]
pub struct Scanner {
    client: Arc<dyn MarketDataClient>,
    reporter: Arc<Reporter>,
    settings: ScanSettings,
}

impl Scanner {
    pub fn new(
        client: Arc<dyn MarketDataClient>,
        reporter: Arc<Reporter>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            client,
            reporter,
            settings,
        }
    }

    /// Scan the override symbol if given, otherwise the resolved universe.
    pub async fn run_configured(
        &self,
        universe: &UniverseProvider,
        symbol_override: Option<Symbol>,
    ) -> ScanSummary {
        match symbol_override {
            Some(symbol) => self.run(ScanTarget::Single(symbol)).await,
            None => {
                let symbols = universe.resolve().await;
                self.run(ScanTarget::Universe(symbols)).await
            }
        }
    }

    /// Run one scan pass to completion.
    pub async fn run(&self, target: ScanTarget) -> ScanSummary {
        let mut summary = ScanSummary::new(Utc::now());

        match target {
            ScanTarget::Single(symbol) => {
                info!(symbol = %symbol, "Querying single symbol");
                summary.dispatched = 1;
                let outcome = self.process_symbol(&symbol).await;
                record(&mut summary, outcome);
            }
            ScanTarget::Universe(symbols) => {
                info!(
                    symbols = symbols.len(),
                    workers = self.settings.workers,
                    "Querying all symbols"
                );
                summary.dispatched = symbols.len();
                let tally = self.scan_pool(symbols).await;
                summary.merge(&tally);
            }
        }

        summary.completed_at = Utc::now();
        summary
    }

    async fn scan_pool(&self, symbols: Vec<Symbol>) -> ScanSummary {
        let mut tally = ScanSummary::new(Utc::now());
        if symbols.is_empty() {
            return tally;
        }

        let workers = self.settings.workers.clamp(1, symbols.len());
        let (tx, rx) = mpsc::unbounded_channel();
        for symbol in symbols {
            // Receiver is alive until the workers finish; send cannot fail.
            let _ = tx.send(symbol);
        }
        drop(tx);

        let queue: SymbolQueue = Arc::new(Mutex::new(rx));
        let mut set = JoinSet::new();
        for id in 0..workers {
            let worker = self.clone();
            let queue = queue.clone();
            set.spawn(async move { worker.work(id, queue).await });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(worker_tally) => tally.merge(&worker_tally),
                Err(e) => error!(error = %e, "Scan worker aborted"),
            }
        }
        tally
    }

    /// Pull symbols until the queue is drained.
    async fn work(self, id: usize, queue: SymbolQueue) -> ScanSummary {
        let mut tally = ScanSummary::new(Utc::now());
        loop {
            let next = queue.lock().await.recv().await;
            let Some(symbol) = next else { break };
            let outcome = self.process_symbol(&symbol).await;
            record(&mut tally, outcome);
        }
        debug!(worker = id, completed = tally.completed(), "Scan worker finished");
        tally
    }

    /// Run one symbol through the pipeline to a terminal state.
    pub async fn process_symbol(&self, symbol: &Symbol) -> SymbolOutcome {
        let settings = &self.settings;

        let series = match self
            .client
            .fetch_series(symbol, settings.interval, settings.limit)
            .await
        {
            Ok(series) => series,
            Err(e @ Error::InsufficientData { .. }) => {
                debug!(symbol = %symbol, reason = %e, "Not enough data");
                return SymbolOutcome::InsufficientData;
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Failed to fetch series");
                return SymbolOutcome::Failed;
            }
        };

        let value = match settings.indicator.compute(&series.closes) {
            Ok(value) => value,
            Err(e @ Error::InsufficientData { .. }) => {
                debug!(symbol = %symbol, reason = %e, "Not enough data");
                return SymbolOutcome::InsufficientData;
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Failed to compute RSI");
                return SymbolOutcome::Failed;
            }
        };

        if !settings.indicator.is_oversold(value) {
            debug!(symbol = %symbol, rsi = value, "Above threshold");
            return SymbolOutcome::AboveThreshold;
        }

        // The signal is the payload; a missing price does not drop it.
        let spot_price = match self.client.fetch_spot_price(symbol).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Failed to fetch current price");
                None
            }
        };

        self.reporter.report(&ScanResult {
            symbol: symbol.clone(),
            indicator_value: value,
            spot_price,
        });
        SymbolOutcome::Reported
    }
}

fn record(summary: &mut ScanSummary, outcome: SymbolOutcome) {
    match outcome {
        SymbolOutcome::Reported => summary.reported += 1,
        SymbolOutcome::AboveThreshold => summary.above_threshold += 1,
        SymbolOutcome::InsufficientData => summary.insufficient_data += 1,
        SymbolOutcome::Failed => summary.failed += 1,
    }
}
