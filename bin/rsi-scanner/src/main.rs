use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use common::{Config, MarketDataClient};
use engine::{BinanceClient, Reporter, ScanSettings, Scanner, UniverseProvider};

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    // Diagnostics go to stderr; stdout carries only match lines.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(
        period = cfg.rsi_period,
        threshold = cfg.rsi_threshold,
        interval = %cfg.interval,
        workers = cfg.max_workers,
        "RSI scanner starting"
    );

    // ── Market data client ────────────────────────────────────────────────────
    let client: Arc<dyn MarketDataClient> = Arc::new(
        BinanceClient::new(&cfg.binance_base_url, cfg.http_timeout)
            .unwrap_or_else(|e| panic!("Failed to build Binance client: {e}"))
            .with_min_series_len(cfg.rsi_period),
    );

    // ── Universe + scanner ────────────────────────────────────────────────────
    let universe = UniverseProvider::new(
        client.clone(),
        cfg.universe_cache_path.clone(),
        cfg.quote_asset.clone(),
    );
    let scanner = Scanner::new(
        client,
        Arc::new(Reporter::stdout()),
        ScanSettings::from_config(&cfg),
    );

    let summary = scanner
        .run_configured(&universe, cfg.symbol_override.clone())
        .await;
    info!("{summary}");
}
