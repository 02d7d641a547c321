//! Core data types for the trading system.

mod analysis;
mod ohlcv;
mod order;
mod position;
mod quote;
mod symbol;

pub use analysis::{AggregateAnalysis, Recommendation, StrategyResult, BUY_CONFIDENCE_THRESHOLD};
pub use ohlcv::{Bar, BarSeries};
pub use order::{Order, OrderRequest, OrderStatus, Side};
pub use position::{Portfolio, PortfolioSummary, Position, PositionView};
pub use quote::Quote;
pub use symbol::normalize_symbol;
