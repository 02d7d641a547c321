//! Strategy trait definitions.

use crate::error::StrategyError;
use crate::types::{Quote, StrategyResult};
use std::collections::BTreeMap;

/// Configuration trait for strategies.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// Core strategy trait.
///
/// Strategies are stateless: they turn a quote's indicator bag into a set of
/// named boolean signals. Confidence is the fraction of signals that fired.
pub trait Strategy: Send + Sync {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    /// Evaluate the strategy's signals for a quote.
    ///
    /// An absent indicator makes its signal false. Malformed data is an
    /// error, which callers turn into an empty result.
    fn signals(&self, quote: &Quote) -> Result<BTreeMap<String, bool>, StrategyError>;

    /// Score a quote, failing soft to an empty result.
    fn score(&self, quote: &Quote) -> StrategyResult {
        match self.signals(quote) {
            Ok(signals) => StrategyResult::from_signals(self.name(), signals),
            Err(_) => StrategyResult::unavailable(self.name()),
        }
    }

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }
}
