//! Analyze a single symbol.

use anyhow::Result;
use trading_config::AppConfig;

use super::Services;
use crate::cli::AnalyzeArgs;

pub async fn run(args: AnalyzeArgs, config: &AppConfig) -> Result<()> {
    let services = Services::build(config)?;
    let analysis = services.engine.analyze(&args.symbol).await;

    match args.output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&analysis)?),
        _ => {
            println!("{}  confidence {:.2}", analysis.symbol, analysis.aggregate_confidence);
            println!();
            for result in analysis.strategies.values() {
                println!(
                    "  {:<18} {:.2}  {}",
                    result.strategy_name, result.confidence, result.recommendation
                );
                if result.signals.is_empty() {
                    println!("    (data unavailable)");
                }
                for (signal, fired) in &result.signals {
                    println!("    {:<16} {}", signal, if *fired { "yes" } else { "no" });
                }
            }
        }
    }

    Ok(())
}
