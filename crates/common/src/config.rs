use std::path::PathBuf;
use std::time::Duration;

use crate::{KlineInterval, Symbol};

/// All configuration loaded from environment variables at startup.
/// Every variable is optional; unparsable values fall back to the default.
/// Values that would make a scan meaningless (zero period, zero workers,
/// unknown interval) cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Indicator
    pub rsi_threshold: f64,
    pub rsi_period: usize,

    // Scan
    pub max_workers: usize,
    pub interval: KlineInterval,
    pub kline_limit: usize,
    /// Scan only this symbol instead of the full universe.
    pub symbol_override: Option<Symbol>,

    // Universe
    pub quote_asset: String,
    pub universe_cache_path: PathBuf,

    // Exchange
    pub binance_base_url: String,
    pub http_timeout: Duration,
}

impl Config {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.binance.com";

    /// Load configuration from the process environment.
    /// Loads `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional_env = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let rsi_period = optional_env("RSI_PERIOD")
            .and_then(|v| v.parse().ok())
            .unwrap_or(14);
        if rsi_period == 0 {
            panic!("ERROR: RSI_PERIOD must be at least 1");
        }

        let max_workers = optional_env("MAX_WORKERS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(40);
        if max_workers == 0 {
            panic!("ERROR: MAX_WORKERS must be at least 1");
        }

        let interval = match optional_env("INTERVAL") {
            Some(raw) => raw
                .parse::<KlineInterval>()
                .unwrap_or_else(|e| panic!("ERROR: INTERVAL is invalid: {e}")),
            None => KlineInterval::OneMinute,
        };

        Config {
            rsi_threshold: optional_env("RSI_THRESHOLD")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30.0),
            rsi_period,
            max_workers,
            interval,
            kline_limit: optional_env("KLINE_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            symbol_override: optional_env("SYMBOL")
                .map(Symbol::new)
                .filter(|s| !s.is_empty()),
            quote_asset: optional_env("QUOTE_ASSET")
                .map(|v| v.to_uppercase())
                .unwrap_or_else(|| "USDT".to_string()),
            universe_cache_path: optional_env("UNIVERSE_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/coins.txt")),
            binance_base_url: optional_env("BINANCE_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            http_timeout: Duration::from_secs(
                optional_env("HTTP_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }
}
