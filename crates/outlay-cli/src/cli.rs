//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Outlay - spot subscriptions and forecast your spending
#[derive(Parser)]
#[command(name = "outlay")]
#[command(about = "Transaction analysis: subscriptions, spending, forecasts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Transaction CSV file (date,amount,description,category)
    #[arg(short, long, global = true, default_value = "transactions.csv")]
    pub file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Analysis date anchor (YYYY-MM-DD, defaults to the current date)
    ///
    /// Next-charge projections advance past this date. Pin it to make runs
    /// reproducible in scripts and tests.
    #[arg(long, global = true)]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect recurring subscriptions
    Detect {
        /// Minimum charge occurrences before a series qualifies
        #[arg(long, default_value = "2")]
        min_occurrences: usize,
    },

    /// Spending rollup by category or merchant
    Spending {
        /// Grouping dimension: category, merchant
        #[arg(short, long, default_value = "category")]
        group_by: String,
    },

    /// Week-over-week spending trend
    Trend,

    /// Largest single expenses
    Biggest {
        /// How many expenses to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Search transactions by merchant or category
    Search {
        /// Case-insensitive substring to match
        query: String,
    },

    /// Forecast daily spending
    Forecast {
        /// Days to forecast ahead
        #[arg(long, default_value = "30")]
        horizon: u32,

        /// Method: average, trend, weekly_pattern, seasonal
        #[arg(short, long, default_value = "seasonal")]
        method: String,
    },

    /// Full analysis run: subscriptions, spending, forecast, alerts
    Analyze {
        /// Current balance for overspend alert thresholds
        #[arg(short, long)]
        balance: f64,

        /// Days to forecast ahead
        #[arg(long, default_value = "30")]
        horizon: u32,
    },
}
