use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Series too short for the configured indicator period.
    #[error("Insufficient data: got {got} closes, need more than {period}")]
    InsufficientData { got: usize, period: usize },

    /// Non-success status or transport fault on a per-symbol remote call.
    #[error("Fetch failed for {symbol}: {cause}")]
    FetchFailed { symbol: String, cause: String },

    /// The symbol listing endpoint could not be queried.
    #[error("Symbol universe unavailable: {0}")]
    UniverseUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn fetch_failed(symbol: impl std::fmt::Display, cause: impl std::fmt::Display) -> Self {
        Error::FetchFailed {
            symbol: symbol.to_string(),
            cause: cause.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
