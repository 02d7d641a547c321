//! Technical indicators used to derive quote technicals from daily bars.
//!
//! - Simple moving average (trend presence)
//! - Wilder RSI (oversold detection)
//! - Relative volume (volume surges)

pub mod momentum;
pub mod moving_average;
pub mod volume;

pub use momentum::Rsi;
pub use moving_average::Sma;
pub use volume::RelativeVolume;
