//! Spending rollup, trend, biggest-expense and search commands

use std::path::Path;

use anyhow::Result;
use outlay_core::{
    aggregate, GroupBy, TrendDirection,
};

use super::{load_transactions, truncate};

pub fn cmd_spending(file: &Path, group_by: &str, json: bool) -> Result<()> {
    let transactions = load_transactions(file)?;

    let group_by: GroupBy = group_by.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let breakdown = aggregate::group_spending(&transactions, group_by);

    if json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
        return Ok(());
    }

    println!();
    println!("📊 Spending Breakdown");
    println!("   ─────────────────────────────────────────────────────────────");

    if breakdown.groups.is_empty() {
        println!("   No spending found.");
        return Ok(());
    }

    println!("   Total: ${:.2}", breakdown.total_spending);
    println!();
    println!(
        "   {:25} │ {:>10} │ {:>6} │ {:>5} │ {:>8}",
        "Group", "Amount", "%", "Count", "Avg"
    );
    println!("   ──────────────────────────┼────────────┼────────┼───────┼──────────");

    for group in &breakdown.groups {
        println!(
            "   {:25} │ {:>10.2} │ {:>5.1}% │ {:>5} │ {:>8.2}",
            truncate(&group.key, 25),
            group.total,
            group.percentage,
            group.count,
            group.avg_transaction
        );
    }

    Ok(())
}

pub fn cmd_trend(file: &Path, json: bool) -> Result<()> {
    let transactions = load_transactions(file)?;
    let trend = aggregate::weekly_trend(&transactions);

    if json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
        return Ok(());
    }

    println!();
    println!("📈 Weekly Spending Trend");
    println!("   ─────────────────────────────────────────────────────────────");

    if trend.weekly_totals.is_empty() {
        println!("   No spending found.");
        return Ok(());
    }

    for week in &trend.weekly_totals {
        println!("   week of {} │ {:>10.2}", week.week_start, week.total);
    }

    println!("   ─────────────────────────────────────────────────────────────");
    match trend.direction {
        TrendDirection::InsufficientData => {
            println!("   Not enough history for a direction (need 4+ weeks).")
        }
        direction => println!(
            "   Direction: {} ({:+.1}% vs earlier weeks)",
            direction.as_str(),
            trend.change_percent
        ),
    }

    Ok(())
}

pub fn cmd_biggest(file: &Path, limit: usize, json: bool) -> Result<()> {
    let transactions = load_transactions(file)?;
    let expenses = aggregate::biggest_expenses(&transactions, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&expenses)?);
        return Ok(());
    }

    if expenses.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    println!();
    println!("💸 Biggest Expenses");
    println!("   ─────────────────────────────────────────────────────────────");
    for expense in &expenses {
        println!(
            "   {} │ {:>10.2} │ {}",
            expense.date,
            expense.amount,
            truncate(&expense.merchant, 30)
        );
    }

    Ok(())
}

pub fn cmd_search(file: &Path, query: &str, json: bool) -> Result<()> {
    let transactions = load_transactions(file)?;
    let matches = aggregate::search(&transactions, query);

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No transactions matched \"{}\".", query);
        return Ok(());
    }

    let total: f64 = matches.iter().map(|t| t.amount).sum();

    println!();
    println!("🔍 Matches for \"{}\"", query);
    println!("   ─────────────────────────────────────────────────────────────");
    for tx in &matches {
        println!(
            "   {} │ {:>10.2} │ {:22} │ {}",
            tx.date,
            tx.amount,
            truncate(&tx.merchant, 22),
            truncate(&tx.primary_category, 20)
        );
    }
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {} transaction(s), ${:.2} total", matches.len(), total);

    Ok(())
}
