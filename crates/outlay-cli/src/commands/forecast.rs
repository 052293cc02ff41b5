//! Spending forecast command

use std::path::Path;

use anyhow::Result;
use outlay_core::{
    aggregate, Confidence, ExclusionPolicy, ForecastMethod, Forecaster,
};

use super::load_transactions;

pub fn cmd_forecast(file: &Path, horizon: u32, method: &str, json: bool) -> Result<()> {
    let transactions = load_transactions(file)?;

    let method: ForecastMethod = method.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let start = transactions.iter().map(|t| t.date).min();
    let end = transactions.iter().map(|t| t.date).max();
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            println!("No expense transactions to forecast from.");
            return Ok(());
        }
    };

    let series = aggregate::daily_series(&transactions, start, end, &ExclusionPolicy::default())?;
    let forecast = Forecaster::new().forecast(&series, horizon, method)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }

    println!();
    println!("🔮 Spending Forecast ({} days, {})", forecast.horizon_days, forecast.method);
    println!("   History: {} to {} ({} days)", start, end, series.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for week in &forecast.weekly {
        println!("   week of {} │ {:>10.2}", week.week_start, week.total);
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Projected total: ${:.2}", forecast.total);
    let confidence_note = match forecast.confidence {
        Confidence::Medium => "medium (30+ days of history)",
        Confidence::Low => "low (short history)",
    };
    println!("   Confidence: {}", confidence_note);

    Ok(())
}
