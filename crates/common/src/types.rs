use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Exchange symbol identifier, e.g. "BTCUSDT". Always trimmed and uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(s)
    }
}

/// One record from the exchange's symbol listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    /// "TRADING" when the pair is live; "BREAK", "HALT", etc. otherwise.
    pub status: String,
    #[serde(default)]
    pub base_asset: String,
    pub quote_asset: String,
}

impl SymbolInfo {
    pub const STATUS_TRADING: &'static str = "TRADING";

    pub fn is_trading(&self) -> bool {
        self.status == Self::STATUS_TRADING
    }
}

/// Closing prices for one symbol, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub closes: Vec<f64>,
}

impl PriceSeries {
    pub fn new(symbol: Symbol, closes: Vec<f64>) -> Self {
        Self { symbol, closes }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// A symbol whose indicator crossed below the threshold during a scan pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub symbol: Symbol,
    pub indicator_value: f64,
    /// `None` when the spot price lookup failed after the match.
    pub spot_price: Option<f64>,
}

/// Kline sampling interval as accepted by the Binance REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KlineInterval {
    #[default]
    OneMinute,
    ThreeMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    FourHours,
    SixHours,
    EightHours,
    TwelveHours,
    OneDay,
    ThreeDays,
    OneWeek,
    OneMonth,
}

impl KlineInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            KlineInterval::OneMinute => "1m",
            KlineInterval::ThreeMinutes => "3m",
            KlineInterval::FiveMinutes => "5m",
            KlineInterval::FifteenMinutes => "15m",
            KlineInterval::ThirtyMinutes => "30m",
            KlineInterval::OneHour => "1h",
            KlineInterval::TwoHours => "2h",
            KlineInterval::FourHours => "4h",
            KlineInterval::SixHours => "6h",
            KlineInterval::EightHours => "8h",
            KlineInterval::TwelveHours => "12h",
            KlineInterval::OneDay => "1d",
            KlineInterval::ThreeDays => "3d",
            KlineInterval::OneWeek => "1w",
            KlineInterval::OneMonth => "1M",
        }
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KlineInterval {
    type Err = Error;

    // Case-sensitive: "1m" is a minute, "1M" is a month.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let interval = match s.trim() {
            "1m" => KlineInterval::OneMinute,
            "3m" => KlineInterval::ThreeMinutes,
            "5m" => KlineInterval::FiveMinutes,
            "15m" => KlineInterval::FifteenMinutes,
            "30m" => KlineInterval::ThirtyMinutes,
            "1h" => KlineInterval::OneHour,
            "2h" => KlineInterval::TwoHours,
            "4h" => KlineInterval::FourHours,
            "6h" => KlineInterval::SixHours,
            "8h" => KlineInterval::EightHours,
            "12h" => KlineInterval::TwelveHours,
            "1d" => KlineInterval::OneDay,
            "3d" => KlineInterval::ThreeDays,
            "1w" => KlineInterval::OneWeek,
            "1M" => KlineInterval::OneMonth,
            other => {
                return Err(Error::Config(format!("unknown kline interval '{other}'")));
            }
        };
        Ok(interval)
    }
}

/// What a scan pass covers.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanTarget {
    /// Process one symbol inline, bypassing universe resolution.
    Single(Symbol),
    Universe(Vec<Symbol>),
}

/// Counters for one completed scan pass.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub dispatched: usize,
    pub reported: usize,
    pub above_threshold: usize,
    pub insufficient_data: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ScanSummary {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            dispatched: 0,
            reported: 0,
            above_threshold: 0,
            insufficient_data: 0,
            failed: 0,
            started_at,
            completed_at: started_at,
        }
    }

    /// Number of symbols that reached a terminal state.
    pub fn completed(&self) -> usize {
        self.reported + self.above_threshold + self.insufficient_data + self.failed
    }

    pub fn duration_secs(&self) -> f64 {
        (self.completed_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    pub fn merge(&mut self, other: &ScanSummary) {
        self.dispatched += other.dispatched;
        self.reported += other.reported;
        self.above_threshold += other.above_threshold;
        self.insufficient_data += other.insufficient_data;
        self.failed += other.failed;
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scanned {} symbols in {:.1}s: {} reported, {} above threshold, {} insufficient data, {} failed",
            self.dispatched,
            self.duration_secs(),
            self.reported,
            self.above_threshold,
            self.insufficient_data,
            self.failed
        )
    }
}
