pub mod binance;
pub mod report;
pub mod scanner;
pub mod universe;

pub use binance::BinanceClient;
pub use report::Reporter;
pub use scanner::{ScanSettings, Scanner, SymbolOutcome};
pub use universe::UniverseProvider;
