use std::io::Write;
use std::sync::Mutex;

use tracing::warn;

use common::ScanResult;

/// Emits one line per match to an injected sink.
///
/// The sink is the only state shared between scan workers. A single mutex
/// makes each line atomic; ordering across symbols is not guaranteed.
pub struct Reporter {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Reporter {
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn report(&self, result: &ScanResult) {
        let line = format_line(result);

        // A panicked writer leaves the buffer usable; keep reporting.
        let mut sink = self.sink.lock().unwrap_or_else(|p| p.into_inner());
        if let Err(e) = writeln!(sink, "{line}").and_then(|_| sink.flush()) {
            warn!(symbol = %result.symbol, error = %e, "Failed to write scan result");
        }
    }
}

fn format_line(result: &ScanResult) -> String {
    let price = match result.spot_price {
        Some(p) => format!("{p:.4}"),
        None => "unavailable".to_string(),
    };
    format!(
        "Coin: {} | RSI: {:.2} | Price: {}",
        result.symbol, result.indicator_value, price
    )
}
