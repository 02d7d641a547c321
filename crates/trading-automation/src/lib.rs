//! Automated trading loop.
//!
//! - [`MarketRegime`] / [`RegimeDetector`]: bullish, bearish or mixed from
//!   headline index moves
//! - [`CandidateScreen`] / [`UniverseScreen`]: regime-driven watchlist
//! - [`AutomatedTrader`]: start/stop controller running analysis and orders

mod controller;
mod regime;
mod screen;

pub use controller::{
    AutomatedTrader, ControllerConfig, ControllerState, ControllerStatus, CycleError, CycleReport,
};
pub use regime::{default_indices, MarketRegime, RegimeDetector};
pub use screen::{CandidateScreen, ScreenKind, UniverseScreen};
