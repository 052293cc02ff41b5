//! Outlay CLI - Spending analysis from transaction exports
//!
//! Usage:
//!   outlay detect --file transactions.csv       Detect subscriptions
//!   outlay spending --group-by merchant         Spending rollup
//!   outlay forecast --horizon 30                Forecast daily spending
//!   outlay analyze --balance 1200               Full run with overspend alerts

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let today = commands::resolve_today(cli.today.as_deref())?;

    match cli.command {
        Commands::Detect { min_occurrences } => {
            commands::cmd_detect(&cli.file, min_occurrences, today, cli.json)
        }
        Commands::Spending { group_by } => commands::cmd_spending(&cli.file, &group_by, cli.json),
        Commands::Trend => commands::cmd_trend(&cli.file, cli.json),
        Commands::Biggest { limit } => commands::cmd_biggest(&cli.file, limit, cli.json),
        Commands::Search { query } => commands::cmd_search(&cli.file, &query, cli.json),
        Commands::Forecast { horizon, method } => {
            commands::cmd_forecast(&cli.file, horizon, &method, cli.json)
        }
        Commands::Analyze { balance, horizon } => {
            commands::cmd_analyze(&cli.file, balance, horizon, today, cli.json)
        }
    }
}
