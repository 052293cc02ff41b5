//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Full pipeline run (subscriptions, spending, forecast, alerts)
//! - `detect` - Subscription detection
//! - `forecast` - Spending forecast command
//! - `spending` - Spending rollups, trends, biggest expenses, search

pub mod analyze;
pub mod detect;
pub mod forecast;
pub mod spending;

// Re-export command functions for main.rs
pub use analyze::*;
pub use detect::*;
pub use forecast::*;
pub use spending::*;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use outlay_core::{normalize, read_csv_file, NormalizedTransaction};
use tracing::debug;

/// Load and normalize a transaction CSV
pub fn load_transactions(file: &Path) -> Result<Vec<NormalizedTransaction>> {
    let raw = read_csv_file(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let transactions = normalize(&raw).context("Failed to normalize transactions")?;
    debug!(
        raw = raw.len(),
        expenses = transactions.len(),
        "Loaded transactions"
    );
    Ok(transactions)
}

/// Resolve the analysis anchor date: --today if given, else the current date
pub fn resolve_today(today: Option<&str>) -> Result<NaiveDate> {
    today
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("Invalid --today format (use YYYY-MM-DD)")
        .map(|d| d.unwrap_or_else(|| chrono::Utc::now().date_naive()))
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
