//! Subscription detection command

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use outlay_core::{AnalysisConfig, RecurrenceDetector};

use super::{load_transactions, truncate};

pub fn cmd_detect(
    file: &Path,
    min_occurrences: usize,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let transactions = load_transactions(file)?;

    let config = AnalysisConfig {
        min_occurrences,
        ..AnalysisConfig::default()
    };
    let detector = RecurrenceDetector::with_config(config);
    let subscriptions = detector.detect(&transactions, today);

    if json {
        println!("{}", serde_json::to_string_pretty(&subscriptions)?);
        return Ok(());
    }

    if subscriptions.is_empty() {
        println!("No subscriptions detected.");
        return Ok(());
    }

    let monthly_total: f64 = subscriptions.iter().map(|s| s.monthly_cost()).sum();

    println!();
    println!("📋 Detected Subscriptions");
    println!("   ─────────────────────────────────────────────────────────────");

    for sub in &subscriptions {
        let next_str = sub
            .next_charge
            .map(|d| d.to_string())
            .unwrap_or_else(|| "?".to_string());

        println!(
            "   {:22} │ {:>9} │ {:<14} │ {:>2}x │ next {}",
            truncate(&sub.merchant, 22),
            format!("${:.2}", sub.amount),
            sub.frequency.to_string(),
            sub.occurrence_count,
            next_str
        );
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {} subscription(s), ~${:.2}/month",
        subscriptions.len(),
        monthly_total
    );

    Ok(())
}
