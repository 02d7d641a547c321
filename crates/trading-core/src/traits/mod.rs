//! Core traits for the trading system.

mod broker;
mod indicator;
mod market_data;
mod strategy;

pub use broker::Broker;
pub use indicator::Indicator;
pub use market_data::MarketDataProvider;
pub use strategy::{Strategy, StrategyConfig};
