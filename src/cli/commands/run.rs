//! Automated paper trading command.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;
use trading_automation::{AutomatedTrader, CycleReport, UniverseScreen};
use trading_broker::PaperBroker;
use trading_config::AppConfig;
use trading_core::traits::Broker;
use trading_core::types::PortfolioSummary;
use trading_monitor::{Dashboard, DashboardState};
use trading_risk::RiskManager;

use super::Services;
use crate::cli::RunArgs;

const DASHBOARD_REFRESH: Duration = Duration::from_secs(1);
const DASHBOARD_ORDERS: usize = 20;

pub async fn run(args: RunArgs, config: &AppConfig) -> Result<()> {
    let Services {
        market_data,
        broker,
        engine,
    } = Services::build(config)?;

    let screen = Arc::new(UniverseScreen::new(
        config.screen.universe.clone(),
        market_data,
    ));
    let trader = Arc::new(
        AutomatedTrader::new(
            Arc::clone(&broker) as Arc<dyn Broker>,
            engine,
            screen,
            RiskManager::new(config.risk.clone()),
            config.automation.clone(),
        )
        .with_watchlist(&args.watchlist),
    );

    if args.once {
        let report = trader.run_cycle().await.context("Trading cycle failed")?;
        print_report(&report);
        print_summary(&broker.portfolio_summary().await);
        return Ok(());
    }

    trader.start().await;
    if args.dashboard {
        run_dashboard(&trader, &broker).await?;
    } else {
        info!("Press Ctrl+C to stop");
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for shutdown signal")?;
        info!("Shutdown signal received");
    }
    trader.stop().await;

    print_summary(&broker.portfolio_summary().await);
    Ok(())
}

async fn run_dashboard(trader: &Arc<AutomatedTrader>, broker: &Arc<PaperBroker>) -> Result<()> {
    let (tx, mut rx) = watch::channel(None);

    let refresher = {
        let trader = Arc::clone(trader);
        let broker = Arc::clone(broker);
        tokio::spawn(async move {
            loop {
                let status = trader.status().await;
                let mut recent_orders = broker.trade_history().await;
                let skip = recent_orders.len().saturating_sub(DASHBOARD_ORDERS);
                recent_orders.drain(..skip);

                if tx.send(Some(DashboardState { status, recent_orders })).is_err() {
                    break;
                }
                tokio::time::sleep(DASHBOARD_REFRESH).await;
            }
        })
    };

    let result = tokio::task::spawn_blocking(move || {
        Dashboard::new(250).run(|| {
            if rx.has_changed().unwrap_or(false) {
                rx.borrow_and_update().clone()
            } else {
                None
            }
        })
    })
    .await;
    refresher.abort();

    result
        .context("Dashboard task failed")?
        .context("Dashboard terminal error")
}

fn print_report(report: &CycleReport) {
    println!("Regime: {}", report.regime);
    println!("Watchlist: {}", report.watched_symbols.join(", "));
    if report.orders.is_empty() {
        println!("No orders placed");
    }
    for order in &report.orders {
        println!(
            "  {} {} x {} @ ${:.2}",
            order.side, order.quantity, order.symbol, order.price
        );
    }
    println!();
}

fn print_summary(summary: &PortfolioSummary) {
    println!("Portfolio value: ${:.2}", summary.total_value);
    println!("Cash: ${:.2}", summary.cash_balance);
    println!("Positions: {} (${:.2})", summary.position_count, summary.positions_value);
    println!("Return: {:.2}%", summary.total_return_percent);
}
