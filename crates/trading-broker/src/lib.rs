//! Simulated order execution.
//!
//! [`PortfolioLedger`] holds cash and positions; [`PaperBroker`] validates
//! orders, applies them to the ledger and keeps the trade history.

mod ledger;
mod paper;

pub use ledger::PortfolioLedger;
pub use paper::PaperBroker;
