//! Stock analysis strategies.
//!
//! Three independent strategies score a quote's indicator bag:
//! - Value investing (P/E, P/B, debt/equity)
//! - Growth hunting (EPS growth, sector, acceleration)
//! - Quantitative edge (RSI, relative volume, moving averages)
//!
//! [`StrategyEngine`] runs all of them and averages their confidences.

mod engine;
mod growth;
mod metric;
mod quant;
mod registry;
mod value;

pub use engine::StrategyEngine;
pub use growth::{GrowthConfig, GrowthStrategy};
pub use quant::{QuantConfig, QuantStrategy};
pub use registry::{StrategyInfo, StrategyKind};
pub use value::{ValueConfig, ValueStrategy};
