//! Risk management for automated trading.
//!
//! Provides half-Kelly position sizing with a hard per-position cap, and the
//! enter/exit/hold decision policy.

mod position_sizer;
mod risk_manager;

pub use position_sizer::{PositionSizer, SizingConfig};
pub use risk_manager::{RiskConfig, RiskDecision, RiskManager};
