//! In-memory quote source.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use trading_core::error::DataError;
use trading_core::traits::MarketDataProvider;
use trading_core::types::{normalize_symbol, Quote};

/// Mutable quote table, useful for simulations and tests.
#[derive(Debug, Default)]
pub struct InMemoryQuoteSource {
    quotes: RwLock<HashMap<String, Quote>>,
}

impl InMemoryQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source pre-populated with quotes.
    pub fn with_quotes(quotes: impl IntoIterator<Item = Quote>) -> Self {
        let source = Self::new();
        for quote in quotes {
            source.set_quote(quote);
        }
        source
    }

    /// Insert or replace a quote.
    pub fn set_quote(&self, mut quote: Quote) {
        quote.symbol = normalize_symbol(&quote.symbol);
        let mut quotes = self.quotes.write().unwrap_or_else(|e| e.into_inner());
        quotes.insert(quote.symbol.clone(), quote);
    }

    /// Remove a quote, making the symbol unavailable.
    pub fn remove_quote(&self, symbol: &str) -> Option<Quote> {
        let mut quotes = self.quotes.write().unwrap_or_else(|e| e.into_inner());
        quotes.remove(&normalize_symbol(symbol))
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryQuoteSource {
    async fn get_quote(&self, symbol: &str) -> Result<Quote, DataError> {
        let symbol = normalize_symbol(symbol);
        let quotes = self.quotes.read().unwrap_or_else(|e| e.into_inner());
        quotes
            .get(&symbol)
            .cloned()
            .ok_or(DataError::SymbolNotFound(symbol))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
