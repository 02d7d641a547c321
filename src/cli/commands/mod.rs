//! CLI command implementations.

pub mod analyze;
pub mod init;
pub mod order;
pub mod run;
pub mod strategies;
pub mod validate;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use trading_broker::PaperBroker;
use trading_config::AppConfig;
use trading_core::traits::MarketDataProvider;
use trading_data::{CsvQuoteSource, ResilientProvider};
use trading_strategies::{StrategyEngine, StrategyKind};

/// Market data, ledger and strategies wired from configuration.
pub struct Services {
    pub market_data: Arc<dyn MarketDataProvider>,
    pub broker: Arc<PaperBroker>,
    pub engine: StrategyEngine,
}

impl Services {
    pub fn build(config: &AppConfig) -> Result<Self> {
        let source = CsvQuoteSource::load(
            config.data.quotes_path.as_deref(),
            config.data.bars_dir.as_deref(),
        )
        .context("Failed to load market data")?;
        info!(symbols = source.len(), "Loaded market data");

        let market_data: Arc<dyn MarketDataProvider> =
            Arc::new(ResilientProvider::new(source, config.data.retry.clone()));

        Ok(Self {
            broker: Arc::new(PaperBroker::new(
                config.ledger.initial_balance,
                Arc::clone(&market_data),
            )),
            engine: StrategyEngine::with_strategies(
                Arc::clone(&market_data),
                configured_strategies(config)?,
            ),
            market_data,
        })
    }
}

pub fn configured_strategies(config: &AppConfig) -> Result<Vec<StrategyKind>> {
    StrategyKind::from_configs(
        config.strategies.value.clone(),
        config.strategies.growth.clone(),
        config.strategies.quant.clone(),
    )
    .context("Invalid strategy configuration")
}
