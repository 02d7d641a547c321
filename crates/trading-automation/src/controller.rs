//! Automated trading controller.
//!
//! One background task per controller repeats a cycle: classify the market
//! regime, refresh the watchlist from the matching candidate screen, then
//! analyze and trade each watched symbol in order. Cycles never overlap and
//! the loop only ends through [`AutomatedTrader::stop`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use trading_core::error::DataError;
use trading_core::traits::Broker;
use trading_core::types::{
    normalize_symbol, AggregateAnalysis, Order, OrderRequest, PortfolioSummary, PositionView,
};
use trading_risk::{RiskDecision, RiskManager};
use trading_strategies::StrategyEngine;

use crate::regime::default_indices;
use crate::{CandidateScreen, MarketRegime, RegimeDetector};

/// Controller cadence and watchlist settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Sleep after a completed cycle
    pub cycle_interval_secs: u64,
    /// Sleep after a failed cycle
    pub error_backoff_secs: u64,
    /// Maximum watched symbols
    pub max_watchlist: usize,
    /// Headline indices used for regime classification
    pub indices: Vec<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cycle_interval_secs: 300,
            error_backoff_secs: 60,
            max_watchlist: 10,
            indices: default_indices(),
        }
    }
}

impl ControllerConfig {
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}

/// Errors that abort a cycle and trigger the backoff.
///
/// Per-symbol problems never surface here: they are logged and the cycle
/// moves on to the next symbol.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CycleError {
    #[error("Regime detection failed: {0}")]
    Regime(#[source] DataError),

    #[error("Candidate screen failed: {0}")]
    Screen(#[source] DataError),
}

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    Stopped,
    Running,
}

/// Outcome of one completed cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub regime: MarketRegime,
    pub watched_symbols: Vec<String>,
    /// Orders executed this cycle, in watchlist order
    pub orders: Vec<Order>,
}

/// Point-in-time view of the controller.
#[derive(Debug, Clone, Serialize)]
pub struct ControllerStatus {
    pub running: bool,
    pub regime: Option<MarketRegime>,
    pub watched_symbols: Vec<String>,
    /// Latest analysis per watched symbol
    pub last_analysis: BTreeMap<String, AggregateAnalysis>,
    pub portfolio: PortfolioSummary,
    pub positions: BTreeMap<String, PositionView>,
    pub cycles_completed: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl ControllerStatus {
    pub fn state(&self) -> ControllerState {
        if self.running {
            ControllerState::Running
        } else {
            ControllerState::Stopped
        }
    }
}

#[derive(Debug, Default)]
struct LoopState {
    running: bool,
    regime: Option<MarketRegime>,
    watched_symbols: Vec<String>,
    last_analysis: BTreeMap<String, AggregateAnalysis>,
    cycles_completed: u64,
    last_cycle_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

struct TraderInner {
    broker: Arc<dyn Broker>,
    engine: StrategyEngine,
    screen: Arc<dyn CandidateScreen>,
    risk: RiskManager,
    regime: RegimeDetector,
    config: ControllerConfig,
    state: Mutex<LoopState>,
    /// Serializes cycles between the loop and direct `run_cycle` calls
    cycle_lock: tokio::sync::Mutex<()>,
}

struct LoopHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Drives regime detection, screening, analysis and order placement.
pub struct AutomatedTrader {
    inner: Arc<TraderInner>,
    task: tokio::sync::Mutex<Option<LoopHandle>>,
}

impl AutomatedTrader {
    pub fn new(
        broker: Arc<dyn Broker>,
        engine: StrategyEngine,
        screen: Arc<dyn CandidateScreen>,
        risk: RiskManager,
        config: ControllerConfig,
    ) -> Self {
        let regime = RegimeDetector::new(config.indices.clone());
        Self {
            inner: Arc::new(TraderInner {
                broker,
                engine,
                screen,
                risk,
                regime,
                config,
                state: Mutex::new(LoopState::default()),
                cycle_lock: tokio::sync::Mutex::new(()),
            }),
            task: tokio::sync::Mutex::new(None),
        }
    }

    /// Seed the watchlist shown before the first cycle.
    pub fn with_watchlist(self, symbols: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        let limit = self.inner.config.max_watchlist;
        self.inner.state().watched_symbols = symbols
            .into_iter()
            .map(|s| normalize_symbol(s.as_ref()))
            .take(limit)
            .collect();
        self
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Start the background loop. No-op when already running.
    pub async fn start(&self) {
        let mut task = self.task.lock().await;
        if let Some(previous) = task.as_ref() {
            if !previous.handle.is_finished() {
                debug!("Automated trading already running");
                return;
            }
            warn!("Previous trading loop exited unexpectedly, restarting");
        }

        self.inner.state().running = true;
        let (shutdown, receiver) = watch::channel(false);
        let handle = tokio::spawn(run_loop(Arc::clone(&self.inner), receiver));
        *task = Some(LoopHandle { shutdown, handle });
        info!(
            interval_secs = self.inner.config.cycle_interval_secs,
            "Automated trading started"
        );
    }

    /// Stop the loop and wait for it to exit. No-op when already stopped.
    ///
    /// Once this returns no further orders are placed until the next
    /// [`start`](Self::start).
    pub async fn stop(&self) {
        let mut task = self.task.lock().await;
        let Some(LoopHandle { shutdown, handle }) = task.take() else {
            debug!("Automated trading already stopped");
            return;
        };

        let _ = shutdown.send(true);
        match handle.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => error!(error = %e, "Automated trading task panicked"),
        }
        self.inner.state().running = false;
        info!("Automated trading stopped");
    }

    pub fn is_running(&self) -> bool {
        self.inner.state().running
    }

    /// Run one cycle in the caller's task.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        self.inner.run_cycle().await
    }

    /// Snapshot of loop state, portfolio and positions.
    pub async fn status(&self) -> ControllerStatus {
        let portfolio = self.inner.broker.portfolio_summary().await;
        let positions = self.inner.broker.active_positions().await;

        let state = self.inner.state();
        ControllerStatus {
            running: state.running,
            regime: state.regime,
            watched_symbols: state.watched_symbols.clone(),
            last_analysis: state.last_analysis.clone(),
            portfolio,
            positions,
            cycles_completed: state.cycles_completed,
            last_cycle_at: state.last_cycle_at,
            last_error: state.last_error.clone(),
        }
    }
}

/// Clears the running flag when the loop task ends, panics included.
struct RunningFlag(Arc<TraderInner>);

impl Drop for RunningFlag {
    fn drop(&mut self) {
        self.0.state().running = false;
    }
}

async fn run_loop(inner: Arc<TraderInner>, mut shutdown: watch::Receiver<bool>) {
    let _running = RunningFlag(Arc::clone(&inner));
    loop {
        let outcome = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            outcome = inner.run_cycle() => outcome,
        };

        let pause = match outcome {
            Ok(report) => {
                info!(
                    regime = %report.regime,
                    watched = report.watched_symbols.len(),
                    orders = report.orders.len(),
                    "Cycle complete"
                );
                inner.config.cycle_interval()
            }
            Err(e) => {
                error!(
                    error = %e,
                    backoff_secs = inner.config.error_backoff_secs,
                    "Cycle failed, backing off"
                );
                inner.config.error_backoff()
            }
        };

        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = tokio::time::sleep(pause) => {}
        }
    }
    debug!("Trading loop exited");
}

impl TraderInner {
    fn state(&self) -> MutexGuard<'_, LoopState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        let _cycle = self.cycle_lock.lock().await;
        let result = self.cycle().await;

        let mut state = self.state();
        state.last_cycle_at = Some(Utc::now());
        match &result {
            Ok(_) => {
                state.cycles_completed += 1;
                state.last_error = None;
            }
            Err(e) => state.last_error = Some(e.to_string()),
        }
        result
    }

    async fn cycle(&self) -> Result<CycleReport, CycleError> {
        let market_data = self.engine.market_data();
        let regime = self
            .regime
            .detect(market_data.as_ref())
            .await
            .map_err(CycleError::Regime)?;

        let kind = regime.screen();
        let mut watched_symbols = self
            .screen
            .candidates(kind, self.config.max_watchlist)
            .await
            .map_err(CycleError::Screen)?;
        watched_symbols.truncate(self.config.max_watchlist);
        let watched_symbols: Vec<String> = watched_symbols
            .iter()
            .map(|symbol| normalize_symbol(symbol))
            .collect();
        info!(%regime, screen = %kind, symbols = ?watched_symbols, "Watchlist updated");

        {
            let mut state = self.state();
            state.regime = Some(regime);
            state
                .last_analysis
                .retain(|symbol, _| watched_symbols.contains(symbol));
            state.watched_symbols = watched_symbols.clone();
        }

        let mut orders = Vec::new();
        for symbol in &watched_symbols {
            if let Some(order) = self.trade_symbol(symbol).await {
                orders.push(order);
            }
        }

        Ok(CycleReport {
            regime,
            watched_symbols,
            orders,
        })
    }

    /// Analyze one symbol and place at most one order for it.
    async fn trade_symbol(&self, symbol: &str) -> Option<Order> {
        let symbol = normalize_symbol(symbol);
        let held = self
            .broker
            .position(&symbol)
            .await
            .map(|position| position.quantity);

        let analysis = self.engine.analyze(&symbol).await;
        let confidence = analysis.aggregate_confidence;
        self.state().last_analysis.insert(symbol.clone(), analysis);

        let request = match self.risk.evaluate(confidence, held) {
            RiskDecision::Hold { reason } => {
                debug!(symbol = %symbol, %reason, "Holding");
                return None;
            }
            RiskDecision::Enter => {
                let price = self.current_price(&symbol).await?;
                let portfolio_value = self.broker.portfolio_value().await;
                let quantity = self.risk.position_size(portfolio_value, confidence, price);
                if quantity <= Decimal::ZERO {
                    debug!(symbol = %symbol, %price, %portfolio_value, "Position size is zero, skipping buy");
                    return None;
                }
                OrderRequest::buy(&symbol, quantity, price)
            }
            RiskDecision::Exit { quantity } => {
                let price = self.current_price(&symbol).await?;
                OrderRequest::sell(&symbol, quantity, price)
            }
        };

        info!(
            symbol = %symbol,
            side = %request.side,
            quantity = %request.quantity,
            confidence,
            "Placing order"
        );
        match self.broker.place_order(request).await {
            Ok(order) => Some(order),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Order rejected");
                None
            }
        }
    }

    async fn current_price(&self, symbol: &str) -> Option<Decimal> {
        match self.engine.market_data().current_price(symbol).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!(symbol, error = %e, "No usable price, skipping trade");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trading_broker::PaperBroker;
    use trading_core::traits::MarketDataProvider;
    use trading_core::types::{Quote, Side};
    use trading_data::InMemoryQuoteSource;
    use trading_risk::RiskConfig;

    use crate::{ScreenKind, UniverseScreen};
    use async_trait::async_trait;

    fn index_quotes(changes: [f64; 3]) -> Vec<Quote> {
        default_indices()
            .into_iter()
            .zip(changes)
            .map(|(index, change)| Quote::new(index).with_percent_change(change))
            .collect()
    }

    /// Quote where every strategy signal fires.
    fn strong_quote(symbol: &str, price: Decimal) -> Quote {
        Quote {
            pe: Some(10.0),
            pb: Some(1.0),
            debt_to_equity: Some(0.1),
            eps_growth_next5y: Some(30.0),
            eps_growth_next1y: Some(40.0),
            eps_growth_past5y: Some(20.0),
            sector: Some("Technology".into()),
            rsi: Some(25.0),
            relative_volume: Some(3.0),
            sma20: Some(1.0),
            sma50: Some(1.0),
            sma200: Some(1.0),
            ..Quote::new(symbol).with_price(price)
        }
    }

    struct Fixture {
        quotes: Arc<InMemoryQuoteSource>,
        broker: Arc<PaperBroker>,
        trader: AutomatedTrader,
    }

    fn setup(universe: &[&str]) -> Fixture {
        let quotes = Arc::new(InMemoryQuoteSource::new());
        let market_data: Arc<dyn MarketDataProvider> = quotes.clone();
        let broker = Arc::new(PaperBroker::new(dec!(100000), Arc::clone(&market_data)));
        let screen = UniverseScreen::new(
            universe.iter().map(|s| s.to_string()).collect(),
            Arc::clone(&market_data),
        );
        let trader = AutomatedTrader::new(
            broker.clone(),
            StrategyEngine::new(market_data),
            Arc::new(screen),
            RiskManager::new(RiskConfig::default()),
            ControllerConfig::default(),
        );
        Fixture {
            quotes,
            broker,
            trader,
        }
    }

    #[tokio::test]
    async fn test_bullish_cycle_buys_capped_size() {
        let fx = setup(&["AAPL"]);
        for quote in index_quotes([0.5, 0.3, 0.2]) {
            fx.quotes.set_quote(quote);
        }
        fx.quotes.set_quote(strong_quote("AAPL", dec!(150)));

        let report = fx.trader.run_cycle().await.unwrap();

        assert_eq!(report.regime, MarketRegime::Bullish);
        assert_eq!(report.watched_symbols, ["AAPL"]);
        assert_eq!(report.orders.len(), 1);
        let order = &report.orders[0];
        assert_eq!(order.side, Side::Buy);
        // min(floor(50000 / 150), floor(20000 / 150))
        assert_eq!(order.quantity, dec!(133));
        assert_eq!(order.price, dec!(150));

        let status = fx.trader.status().await;
        assert_eq!(status.cycles_completed, 1);
        assert_eq!(status.last_analysis["AAPL"].aggregate_confidence, 1.0);
        assert_eq!(status.portfolio.cash_balance, dec!(80050));
    }

    #[tokio::test]
    async fn test_held_position_not_increased() {
        let fx = setup(&["AAPL"]);
        for quote in index_quotes([0.5, 0.3, 0.2]) {
            fx.quotes.set_quote(quote);
        }
        fx.quotes.set_quote(strong_quote("AAPL", dec!(150)));
        fx.broker
            .execute(OrderRequest::buy("AAPL", dec!(5), dec!(100)))
            .unwrap();

        let report = fx.trader.run_cycle().await.unwrap();
        assert!(report.orders.is_empty());
        assert_eq!(fx.broker.trade_history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_low_confidence_exits_whole_position() {
        let fx = setup(&["AAPL"]);
        for quote in index_quotes([0.5, -0.3, 0.1]) {
            fx.quotes.set_quote(quote);
        }
        fx.quotes.set_quote(Quote {
            relative_volume: Some(1.0),
            ..Quote::new("AAPL").with_price(dec!(120))
        });
        fx.broker
            .execute(OrderRequest::buy("AAPL", dec!(20), dec!(100)))
            .unwrap();

        let report = fx.trader.run_cycle().await.unwrap();

        assert_eq!(report.regime, MarketRegime::Mixed);
        assert_eq!(report.orders.len(), 1);
        assert_eq!(report.orders[0].side, Side::Sell);
        assert_eq!(report.orders[0].quantity, dec!(20));
        assert!(fx.broker.position("AAPL").await.is_none());
        assert_eq!(fx.broker.ledger().cash_balance(), dec!(100400));
    }

    #[tokio::test]
    async fn test_missing_price_skips_trade() {
        let fx = setup(&["AAPL"]);
        for quote in index_quotes([0.5, 0.3, 0.2]) {
            fx.quotes.set_quote(quote);
        }
        let mut quote = strong_quote("AAPL", dec!(1));
        quote.price = None;
        fx.quotes.set_quote(quote);

        let report = fx.trader.run_cycle().await.unwrap();
        assert_eq!(report.watched_symbols, ["AAPL"]);
        assert!(report.orders.is_empty());
    }

    #[tokio::test]
    async fn test_cycle_errors() {
        let fx = setup(&["GONE"]);
        assert!(matches!(
            fx.trader.run_cycle().await,
            Err(CycleError::Regime(DataError::SymbolNotFound(_)))
        ));

        for quote in index_quotes([-2.0, -1.5, -3.0]) {
            fx.quotes.set_quote(quote);
        }
        assert!(matches!(
            fx.trader.run_cycle().await,
            Err(CycleError::Screen(_))
        ));

        let status = fx.trader.status().await;
        assert_eq!(status.cycles_completed, 0);
        assert!(status.last_error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_backs_off_then_recovers() {
        let fx = setup(&["AAPL"]);
        fx.quotes.set_quote(strong_quote("AAPL", dec!(150)));

        fx.trader.start().await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        let status = fx.trader.status().await;
        assert!(status.running);
        assert_eq!(status.cycles_completed, 0);
        assert!(status.last_error.is_some());

        for quote in index_quotes([0.5, 0.3, 0.2]) {
            fx.quotes.set_quote(quote);
        }
        tokio::time::sleep(Duration::from_secs(61)).await;

        let status = fx.trader.status().await;
        assert_eq!(status.cycles_completed, 1);
        assert!(status.last_error.is_none());
        assert_eq!(fx.broker.trade_history().await.len(), 1);

        fx.trader.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_stop_idempotent() {
        let fx = setup(&["AAPL"]).trader.with_watchlist(["aapl", "tse:7203"]);
        assert!(!fx.is_running());
        fx.stop().await;

        fx.start().await;
        fx.start().await;
        assert!(fx.is_running());
        assert_eq!(fx.status().await.watched_symbols, ["AAPL", "7203.T"]);

        fx.stop().await;
        fx.stop().await;
        assert!(!fx.is_running());
        assert_eq!(fx.status().await.state(), ControllerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_orders_after_stop() {
        let fx = setup(&["AAPL"]);
        for quote in index_quotes([0.5, 0.3, 0.2]) {
            fx.quotes.set_quote(quote);
        }
        fx.quotes.set_quote(Quote {
            eps_growth_next5y: Some(10.0),
            ..Quote::new("AAPL").with_price(dec!(150))
        });

        fx.trader.start().await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        fx.trader.stop().await;

        // Becomes tradeable only after the loop is stopped
        fx.quotes.set_quote(strong_quote("AAPL", dec!(150)));
        tokio::time::sleep(Duration::from_secs(3600)).await;

        assert!(fx.broker.trade_history().await.is_empty());
        assert_eq!(fx.trader.status().await.cycles_completed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_waits_cycle_interval() {
        let fx = setup(&["AAPL"]);
        for quote in index_quotes([0.5, 0.3, 0.2]) {
            fx.quotes.set_quote(quote);
        }
        fx.quotes.set_quote(strong_quote("AAPL", dec!(150)));

        fx.trader.start().await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fx.trader.status().await.cycles_completed, 1);

        tokio::time::sleep(Duration::from_secs(298)).await;
        assert_eq!(fx.trader.status().await.cycles_completed, 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        let status = fx.trader.status().await;
        assert_eq!(status.cycles_completed, 2);
        assert!(status.last_error.is_none());
        // Second cycle holds the position bought in the first
        assert_eq!(fx.broker.trade_history().await.len(), 1);

        fx.trader.stop().await;
    }

    #[tokio::test]
    async fn test_analysis_follows_watchlist() {
        let fx = setup(&["AAPL", "MSFT"]);
        for quote in index_quotes([0.5, 0.3, 0.2]) {
            fx.quotes.set_quote(quote);
        }
        fx.quotes.set_quote(strong_quote("AAPL", dec!(150)));
        fx.quotes.set_quote(strong_quote("MSFT", dec!(400)));

        fx.trader.run_cycle().await.unwrap();
        let status = fx.trader.status().await;
        assert_eq!(
            status.last_analysis.keys().collect::<Vec<_>>(),
            ["AAPL", "MSFT"]
        );

        fx.quotes.remove_quote("AAPL");
        let report = fx.trader.run_cycle().await.unwrap();
        assert_eq!(report.watched_symbols, ["MSFT"]);

        let status = fx.trader.status().await;
        assert_eq!(status.last_analysis.keys().collect::<Vec<_>>(), ["MSFT"]);
    }

    struct PanickingScreen;

    #[async_trait]
    impl CandidateScreen for PanickingScreen {
        async fn candidates(
            &self,
            _kind: ScreenKind,
            _limit: usize,
        ) -> Result<Vec<String>, DataError> {
            panic!("screen failed");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dead_loop_reported_stopped() {
        let quotes = Arc::new(InMemoryQuoteSource::with_quotes(index_quotes([0.5, 0.3, 0.2])));
        let market_data: Arc<dyn MarketDataProvider> = quotes;
        let trader = AutomatedTrader::new(
            Arc::new(PaperBroker::new(dec!(100000), Arc::clone(&market_data))),
            StrategyEngine::new(market_data),
            Arc::new(PanickingScreen),
            RiskManager::new(RiskConfig::default()),
            ControllerConfig::default(),
        );

        trader.start().await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(!trader.is_running());
        assert_eq!(trader.status().await.state(), ControllerState::Stopped);

        // A dead loop can be restarted, and stop still joins it cleanly
        trader.start().await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!trader.is_running());
        trader.stop().await;
        assert!(!trader.is_running());
    }
}
