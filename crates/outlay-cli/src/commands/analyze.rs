//! Full analysis pipeline command

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use outlay_core::{
    read_csv_file, AlertSeverity, AnalysisConfig, AnalysisEngine, Collaborators, TrendDirection,
};

use super::truncate;

pub fn cmd_analyze(
    file: &Path,
    balance: f64,
    horizon: u32,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let raw = read_csv_file(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let config = AnalysisConfig {
        horizon_days: horizon,
        ..AnalysisConfig::default()
    };
    let engine = AnalysisEngine::with_config(config);
    let report = engine.run(&raw, balance, today, &Collaborators::default())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("🧾 Analysis Report");
    println!("   ─────────────────────────────────────────────────────────────");

    println!(
        "   Subscriptions: {} (~${:.2}/month)",
        report.subscriptions.len(),
        report.total_monthly_cost
    );
    for sub in &report.subscriptions {
        println!(
            "     • {:22} {:>9} {}",
            truncate(&sub.merchant, 22),
            format!("${:.2}", sub.amount),
            sub.frequency
        );
    }

    println!();
    println!("   Spending: ${:.2} total", report.breakdown.total_spending);
    for group in report.breakdown.groups.iter().take(5) {
        println!(
            "     • {:22} {:>10.2} ({:.1}%)",
            truncate(&group.key, 22),
            group.total,
            group.percentage
        );
    }

    if report.trend.direction != TrendDirection::InsufficientData {
        println!();
        println!(
            "   Trend: {} ({:+.1}%)",
            report.trend.direction.as_str(),
            report.trend.change_percent
        );
    }

    println!();
    match &report.forecast {
        Some(forecast) => {
            println!(
                "   Forecast ({} days, {}): ${:.2} vs ${:.2} balance",
                forecast.horizon_days, forecast.method, forecast.total, balance
            );
        }
        None => println!("   Forecast: skipped (not enough history)"),
    }

    if report.alerts.is_empty() {
        println!("   No overspend alerts. 🎉");
    } else {
        for alert in &report.alerts {
            let icon = match alert.severity {
                AlertSeverity::Critical => "🚨",
                AlertSeverity::Warning => "⚠️",
            };
            println!("   {} {}", icon, alert.message);
        }
    }

    Ok(())
}
