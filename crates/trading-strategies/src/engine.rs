//! Multi-strategy analysis of a single symbol.

use crate::StrategyKind;
use std::sync::Arc;
use tracing::{debug, warn};
use trading_core::{
    traits::{MarketDataProvider, Strategy},
    types::{normalize_symbol, AggregateAnalysis, Quote, StrategyResult},
};

/// Runs every configured strategy against a symbol's quote and averages the
/// confidences.
pub struct StrategyEngine {
    strategies: Vec<StrategyKind>,
    market_data: Arc<dyn MarketDataProvider>,
}

impl StrategyEngine {
    /// Create an engine with the default strategies.
    pub fn new(market_data: Arc<dyn MarketDataProvider>) -> Self {
        Self::with_strategies(market_data, StrategyKind::defaults())
    }

    /// Create an engine with an explicit strategy set.
    pub fn with_strategies(
        market_data: Arc<dyn MarketDataProvider>,
        strategies: Vec<StrategyKind>,
    ) -> Self {
        Self {
            strategies,
            market_data,
        }
    }

    pub fn strategies(&self) -> &[StrategyKind] {
        &self.strategies
    }

    pub fn market_data(&self) -> &Arc<dyn MarketDataProvider> {
        &self.market_data
    }

    /// Fetch a quote and analyze it.
    ///
    /// Never fails: an unavailable quote yields an analysis where every
    /// strategy is empty and the aggregate confidence is 0.
    pub async fn analyze(&self, symbol: &str) -> AggregateAnalysis {
        let symbol = normalize_symbol(symbol);
        match self.market_data.get_quote(&symbol).await {
            Ok(quote) => self.evaluate(&symbol, &quote),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Quote unavailable, skipping analysis");
                self.unavailable(&symbol)
            }
        }
    }

    /// Analyze an already fetched quote.
    pub fn evaluate(&self, symbol: &str, quote: &Quote) -> AggregateAnalysis {
        let results = self
            .strategies
            .iter()
            .map(|strategy| match strategy.signals(quote) {
                Ok(signals) => StrategyResult::from_signals(strategy.name(), signals),
                Err(e) => {
                    warn!(
                        symbol = %symbol,
                        strategy = strategy.name(),
                        error = %e,
                        "Strategy failed, treating as no signal"
                    );
                    StrategyResult::unavailable(strategy.name())
                }
            })
            .collect();

        let analysis = AggregateAnalysis::new(symbol, results);
        debug!(
            symbol = %symbol,
            confidence = analysis.aggregate_confidence,
            "Analysis complete"
        );
        analysis
    }

    /// Analysis with every strategy empty.
    pub fn unavailable(&self, symbol: &str) -> AggregateAnalysis {
        let results = self
            .strategies
            .iter()
            .map(|strategy| StrategyResult::unavailable(strategy.name()))
            .collect();
        AggregateAnalysis::new(symbol, results)
    }
}
