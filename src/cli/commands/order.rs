//! Manual order command.

use anyhow::{Context, Result};
use trading_config::AppConfig;
use trading_core::traits::Broker;
use trading_core::types::OrderRequest;

use super::Services;
use crate::cli::OrderArgs;

pub async fn run(args: OrderArgs, config: &AppConfig) -> Result<()> {
    let services = Services::build(config)?;

    let price = match args.price {
        Some(price) => price,
        None => services
            .market_data
            .current_price(&args.symbol)
            .await
            .with_context(|| format!("No market price for {}, pass one explicitly", args.symbol))?,
    };

    let request = OrderRequest::new(&args.symbol, args.side, args.quantity, price);
    let order = services
        .broker
        .place_order(request)
        .await
        .context("Order rejected")?;

    println!(
        "{} {} x {} @ ${:.2} ({:?}, id {})",
        order.side, order.quantity, order.symbol, order.price, order.status, order.id
    );
    println!();

    for order in services.broker.trade_history().await {
        println!(
            "  {}  {:<4} {} x {} @ ${:.2}",
            order
                .executed_at
                .unwrap_or(order.created_at)
                .format("%Y-%m-%d %H:%M:%S"),
            order.side,
            order.quantity,
            order.symbol,
            order.price
        );
    }

    let summary = services.broker.portfolio_summary().await;
    println!();
    println!("Portfolio value: ${:.2}", summary.total_value);
    println!("Cash: ${:.2}", summary.cash_balance);
    println!("Return: {:.2}%", summary.total_return_percent);

    Ok(())
}
