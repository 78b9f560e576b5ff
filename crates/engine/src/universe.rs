use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use common::{MarketDataClient, Result, Symbol, SymbolInfo};

/// Resolves the set of symbols to scan.
///
/// A cache file, once written, is authoritative: it is never refreshed or
/// checked for staleness. Delete the file to force a new listing.
pub struct UniverseProvider {
    client: Arc<dyn MarketDataClient>,
    cache_path: PathBuf,
    quote_asset: String,
}

impl UniverseProvider {
    pub fn new(
        client: Arc<dyn MarketDataClient>,
        cache_path: impl Into<PathBuf>,
        quote_asset: impl Into<String>,
    ) -> Self {
        Self {
            client,
            cache_path: cache_path.into(),
            quote_asset: quote_asset.into().to_uppercase(),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Resolve the universe, logging and returning an empty list on failure.
    pub async fn resolve(&self) -> Vec<Symbol> {
        match self.try_resolve().await {
            Ok(symbols) => symbols,
            Err(e) => {
                error!(error = %e, "Symbol universe unavailable, scanning nothing");
                Vec::new()
            }
        }
    }

    /// Resolve the universe from cache, or from the listing endpoint.
    pub async fn try_resolve(&self) -> Result<Vec<Symbol>> {
        if self.cache_path.exists() {
            match load_cache(&self.cache_path) {
                Ok(symbols) => {
                    info!(
                        path = %self.cache_path.display(),
                        count = symbols.len(),
                        "Universe cache found, skipping listing request"
                    );
                    return Ok(symbols);
                }
                Err(e) => {
                    warn!(
                        path = %self.cache_path.display(),
                        error = %e,
                        "Universe cache unreadable, querying listing endpoint"
                    );
                }
            }
        }

        info!(quote = %self.quote_asset, "Fetching symbol universe from exchange");
        let listing = self.client.list_symbols().await?;
        let symbols = filter_listing(&listing, &self.quote_asset);
        info!(quote = %self.quote_asset, count = symbols.len(), "Symbol universe resolved");

        if let Err(e) = store_cache(&self.cache_path, &symbols) {
            warn!(
                path = %self.cache_path.display(),
                error = %e,
                "Failed to persist universe cache"
            );
        }

        Ok(symbols)
    }
}

/// Actively trading symbols quoted in `quote_asset`, in listing order.
pub fn filter_listing(listing: &[SymbolInfo], quote_asset: &str) -> Vec<Symbol> {
    dedup(
        listing
            .iter()
            .filter(|info| info.is_trading() && info.quote_asset.eq_ignore_ascii_case(quote_asset))
            .map(|info| Symbol::new(&info.symbol)),
    )
}

fn load_cache(path: &Path) -> Result<Vec<Symbol>> {
    let content = std::fs::read_to_string(path)?;
    Ok(dedup(
        content
            .lines()
            .map(Symbol::new)
            .filter(|s| !s.is_empty()),
    ))
}

fn store_cache(path: &Path, symbols: &[Symbol]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut content = String::with_capacity(symbols.len() * 12);
    for symbol in symbols {
        content.push_str(symbol.as_str());
        content.push('\n');
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn dedup(symbols: impl Iterator<Item = Symbol>) -> Vec<Symbol> {
    let mut seen = HashSet::new();
    symbols.filter(|s| seen.insert(s.clone())).collect()
}
