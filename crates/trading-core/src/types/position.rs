//! Position and portfolio types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A long position in a single security.
///
/// A position only exists while `quantity > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol
    pub symbol: String,
    /// Number of shares held
    pub quantity: Decimal,
    /// Quantity-weighted average purchase price
    pub average_price: Decimal,
    /// When the position last changed
    pub last_updated: DateTime<Utc>,
}

impl Position {
    /// Create a new position.
    pub fn new(symbol: impl Into<String>, quantity: Decimal, average_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            average_price,
            last_updated: Utc::now(),
        }
    }

    /// Cost basis (quantity * average_price).
    pub fn cost_basis(&self) -> Decimal {
        self.quantity.saturating_mul(self.average_price)
    }

    /// The position after buying `quantity` more at `price`, with the
    /// average price re-weighted. `None` if the cost basis overflows.
    pub fn checked_add(&self, quantity: Decimal, price: Decimal) -> Option<Self> {
        let new_quantity = self.quantity.checked_add(quantity)?;
        let cost_basis = self
            .quantity
            .checked_mul(self.average_price)?
            .checked_add(quantity.checked_mul(price)?)?;
        let average_price = if new_quantity > Decimal::ZERO {
            cost_basis.checked_div(new_quantity)?
        } else {
            self.average_price
        };

        Some(Self {
            symbol: self.symbol.clone(),
            quantity: new_quantity,
            average_price,
            last_updated: Utc::now(),
        })
    }

    /// Remove shares. The average price is unchanged.
    pub fn reduce(&mut self, quantity: Decimal) {
        self.quantity -= quantity;
        self.last_updated = Utc::now();
    }

    /// Check if the position has no shares left.
    pub fn is_flat(&self) -> bool {
        self.quantity <= Decimal::ZERO
    }
}

/// A position valued at a current market price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionView {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub current_price: Decimal,
    /// quantity * current_price
    pub market_value: Decimal,
    /// market_value - cost basis
    pub unrealized_pl: Decimal,
    /// Unrealized P&L as a percentage of cost basis (0 when cost basis is 0)
    pub unrealized_pl_percent: Decimal,
}

impl PositionView {
    /// Value a position at the given price.
    pub fn from_position(position: &Position, current_price: Decimal) -> Self {
        let market_value = position.quantity.saturating_mul(current_price);
        let cost_basis = position.cost_basis();
        let unrealized_pl = market_value.saturating_sub(cost_basis);
        let unrealized_pl_percent = unrealized_pl
            .checked_div(cost_basis)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO);

        Self {
            symbol: position.symbol.clone(),
            quantity: position.quantity,
            average_price: position.average_price,
            current_price,
            market_value,
            unrealized_pl,
            unrealized_pl_percent,
        }
    }
}

/// Cash balance and open positions of the paper account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Available cash, never negative
    pub cash_balance: Decimal,
    /// Starting capital, used for return calculations
    pub initial_balance: Decimal,
    /// Map of symbol to position
    pub positions: BTreeMap<String, Position>,
}

impl Portfolio {
    /// Create a new portfolio with initial cash.
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            cash_balance: initial_balance,
            initial_balance,
            positions: BTreeMap::new(),
        }
    }

    /// Get a position by symbol.
    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// Get the number of open positions.
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Get all symbols with open positions.
    pub fn symbols(&self) -> Vec<String> {
        self.positions.keys().cloned().collect()
    }
}

/// Portfolio valuation summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_value: Decimal,
    pub cash_balance: Decimal,
    /// total_value - cash_balance
    pub positions_value: Decimal,
    pub total_return_percent: Decimal,
    pub position_count: usize,
}

impl PortfolioSummary {
    /// Summarize a portfolio given its total value.
    pub fn new(portfolio: &Portfolio, total_value: Decimal) -> Self {
        let total_return_percent = total_value
            .saturating_sub(portfolio.initial_balance)
            .checked_div(portfolio.initial_balance)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO);

        Self {
            total_value,
            cash_balance: portfolio.cash_balance,
            positions_value: total_value.saturating_sub(portfolio.cash_balance),
            total_return_percent,
            position_count: portfolio.position_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_position_add_reweights_average() {
        let position = Position::new("AAPL", dec!(10), dec!(150))
            .checked_add(dec!(10), dec!(170))
            .unwrap();

        assert_eq!(position.quantity, dec!(20));
        assert_eq!(position.average_price, dec!(160));
        assert_eq!(position.cost_basis(), dec!(3200));
    }

    #[test]
    fn test_position_add_overflow() {
        let position = Position::new("AAPL", Decimal::MAX, dec!(1));
        assert!(position.checked_add(dec!(1), dec!(1)).is_none());

        let position = Position::new("AAPL", dec!(1), dec!(1));
        assert!(position.checked_add(dec!(2), Decimal::MAX).is_none());
    }

    #[test]
    fn test_position_reduce_keeps_average() {
        let mut position = Position::new("AAPL", dec!(20), dec!(160));
        position.reduce(dec!(5));
        assert_eq!(position.quantity, dec!(15));
        assert_eq!(position.average_price, dec!(160));
        assert!(!position.is_flat());

        position.reduce(dec!(15));
        assert!(position.is_flat());
    }

    #[test]
    fn test_position_view() {
        let position = Position::new("AAPL", dec!(100), dec!(150));
        let view = PositionView::from_position(&position, dec!(160));

        assert_eq!(view.market_value, dec!(16000));
        assert_eq!(view.unrealized_pl, dec!(1000));
        assert_eq!(view.unrealized_pl_percent.round_dp(4), dec!(6.6667));
    }

    #[test]
    fn test_position_view_zero_cost_basis() {
        let position = Position::new("FREE", dec!(10), Decimal::ZERO);
        let view = PositionView::from_position(&position, dec!(5));

        assert_eq!(view.unrealized_pl, dec!(50));
        assert_eq!(view.unrealized_pl_percent, Decimal::ZERO);
    }

    #[test]
    fn test_portfolio_creation() {
        let portfolio = Portfolio::new(dec!(100000));
        assert_eq!(portfolio.cash_balance, dec!(100000));
        assert_eq!(portfolio.initial_balance, dec!(100000));
        assert_eq!(portfolio.position_count(), 0);
        assert!(portfolio.get_position("AAPL").is_none());
    }

    #[test]
    fn test_portfolio_summary() {
        let mut portfolio = Portfolio::new(dec!(100000));
        portfolio.cash_balance = dec!(98500);
        portfolio
            .positions
            .insert("AAPL".into(), Position::new("AAPL", dec!(10), dec!(150)));

        let summary = PortfolioSummary::new(&portfolio, dec!(100200));
        assert_eq!(summary.positions_value, dec!(1700));
        assert_eq!(summary.total_return_percent, dec!(0.2));
        assert_eq!(summary.position_count, 1);
    }
}
