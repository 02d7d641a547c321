//! Cash and position bookkeeping.

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use trading_core::error::BrokerError;
use trading_core::types::{Portfolio, PortfolioSummary, Position, PositionView};

fn overflow(symbol: &str) -> BrokerError {
    BrokerError::InvalidOrder(format!("order value for {symbol} is out of range"))
}

/// Paper account ledger.
///
/// Every mutation validates first and then applies in full, so a rejected
/// trade leaves cash and positions untouched.
#[derive(Debug, Clone)]
pub struct PortfolioLedger {
    portfolio: Portfolio,
}

impl PortfolioLedger {
    /// Create a ledger holding only cash.
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            portfolio: Portfolio::new(initial_balance),
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn cash_balance(&self) -> Decimal {
        self.portfolio.cash_balance
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.portfolio.get_position(symbol)
    }

    /// Debit cash and add to (or open) a position.
    pub fn apply_buy(
        &mut self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<(), BrokerError> {
        let cost = quantity
            .checked_mul(price)
            .ok_or_else(|| overflow(symbol))?;
        if cost > self.portfolio.cash_balance {
            return Err(BrokerError::InsufficientFunds {
                required: cost,
                available: self.portfolio.cash_balance,
            });
        }

        let position = match self.portfolio.positions.get(symbol) {
            Some(position) => position
                .checked_add(quantity, price)
                .ok_or_else(|| overflow(symbol))?,
            None => Position::new(symbol, quantity, price),
        };

        self.portfolio.cash_balance -= cost;
        self.portfolio.positions.insert(symbol.to_string(), position);
        Ok(())
    }

    /// Credit cash and reduce a position, removing it once flat.
    pub fn apply_sell(
        &mut self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<(), BrokerError> {
        let held = self
            .position(symbol)
            .map(|position| position.quantity)
            .unwrap_or(Decimal::ZERO);
        if quantity > held {
            return Err(BrokerError::InsufficientShares {
                symbol: symbol.to_string(),
                requested: quantity,
                held,
            });
        }

        let cash_balance = quantity
            .checked_mul(price)
            .and_then(|proceeds| self.portfolio.cash_balance.checked_add(proceeds))
            .ok_or_else(|| overflow(symbol))?;

        self.portfolio.cash_balance = cash_balance;
        if let Some(position) = self.portfolio.positions.get_mut(symbol) {
            position.reduce(quantity);
            if position.is_flat() {
                self.portfolio.positions.remove(symbol);
            }
        }
        Ok(())
    }

    /// Cash plus market value of every position with a known price.
    pub fn portfolio_value(&self, prices: &HashMap<String, Decimal>) -> Decimal {
        let positions_value: Decimal = self
            .portfolio
            .positions
            .values()
            .filter_map(|position| {
                prices
                    .get(&position.symbol)
                    .map(|price| position.quantity.saturating_mul(*price))
            })
            .fold(Decimal::ZERO, Decimal::saturating_add);
        self.portfolio.cash_balance.saturating_add(positions_value)
    }

    /// Positions valued at the given prices. Unpriced positions are omitted.
    pub fn active_positions(&self, prices: &HashMap<String, Decimal>) -> BTreeMap<String, PositionView> {
        self.portfolio
            .positions
            .values()
            .filter_map(|position| {
                let price = prices.get(&position.symbol)?;
                Some((
                    position.symbol.clone(),
                    PositionView::from_position(position, *price),
                ))
            })
            .collect()
    }

    pub fn summary(&self, prices: &HashMap<String, Decimal>) -> PortfolioSummary {
        PortfolioSummary::new(&self.portfolio, self.portfolio_value(prices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_buy_sequence_weighted_average() {
        let mut ledger = PortfolioLedger::new(dec!(100000));
        ledger.apply_buy("AAPL", dec!(10), dec!(150)).unwrap();
        ledger.apply_buy("AAPL", dec!(30), dec!(170)).unwrap();
        ledger.apply_buy("AAPL", dec!(10), dec!(100)).unwrap();

        let position = ledger.position("AAPL").unwrap();
        assert_eq!(position.quantity, dec!(50));
        // (1500 + 5100 + 1000) / 50
        assert_eq!(position.average_price, dec!(152));
        assert_eq!(ledger.cash_balance(), dec!(92400));
    }

    #[test]
    fn test_buy_rejected_without_funds() {
        let mut ledger = PortfolioLedger::new(dec!(1000));
        let err = ledger.apply_buy("AAPL", dec!(10), dec!(150)).unwrap_err();

        assert_eq!(
            err,
            BrokerError::InsufficientFunds {
                required: dec!(1500),
                available: dec!(1000)
            }
        );
        assert_eq!(ledger.cash_balance(), dec!(1000));
        assert!(ledger.position("AAPL").is_none());
    }

    #[test]
    fn test_buy_exactly_all_cash() {
        let mut ledger = PortfolioLedger::new(dec!(1500));
        ledger.apply_buy("AAPL", dec!(10), dec!(150)).unwrap();
        assert_eq!(ledger.cash_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_sell_unknown_symbol() {
        let mut ledger = PortfolioLedger::new(dec!(1000));
        assert!(matches!(
            ledger.apply_sell("AAPL", dec!(1), dec!(10)),
            Err(BrokerError::InsufficientShares { held, .. }) if held.is_zero()
        ));
    }

    #[test]
    fn test_valuation_skips_unpriced_positions() {
        let mut ledger = PortfolioLedger::new(dec!(10000));
        ledger.apply_buy("AAPL", dec!(10), dec!(100)).unwrap();
        ledger.apply_buy("MSFT", dec!(10), dec!(200)).unwrap();

        let prices = HashMap::from([("AAPL".to_string(), dec!(110))]);
        assert_eq!(ledger.portfolio_value(&prices), dec!(8100));

        let positions = ledger.active_positions(&prices);
        assert_eq!(positions.len(), 1);
        assert_eq!(positions["AAPL"].unrealized_pl, dec!(100));

        let summary = ledger.summary(&prices);
        assert_eq!(summary.position_count, 2);
        assert_eq!(summary.positions_value, dec!(1100));
    }

    #[test]
    fn test_out_of_range_buy_leaves_ledger_untouched() {
        let mut ledger = PortfolioLedger::new(dec!(100000));
        let huge = dec!(1000000000000000);

        assert!(matches!(
            ledger.apply_buy("AAPL", huge, huge),
            Err(BrokerError::InvalidOrder(_))
        ));
        assert_eq!(ledger.cash_balance(), dec!(100000));
        assert!(ledger.position("AAPL").is_none());
    }

    #[test]
    fn test_out_of_range_sell_proceeds_rejected() {
        let mut ledger = PortfolioLedger::new(dec!(100));
        ledger.apply_buy("AAPL", dec!(1), dec!(10)).unwrap();

        assert!(matches!(
            ledger.apply_sell("AAPL", dec!(1), Decimal::MAX),
            Err(BrokerError::InvalidOrder(_))
        ));
        assert_eq!(ledger.cash_balance(), dec!(90));
        assert_eq!(ledger.position("AAPL").unwrap().quantity, dec!(1));
    }
}
