//! Spending aggregation
//!
//! Buckets expense transactions into the dense daily series the forecaster
//! consumes, plus category/merchant rollups, week-over-week trends, and
//! simple lookups used by report surfaces.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    DailySeries, GroupBy, NormalizedTransaction, SpendingBreakdown, SpendingGroup, SpendingTrend,
    TransactionSummary, TrendDirection, WeeklyTotal,
};
use crate::policy::ExclusionPolicy;

/// Bucket transactions into a dense daily series over `[start, end]`.
///
/// Every date in the range appears exactly once; days without spending hold
/// zero. Transactions whose primary category the policy excludes are dropped
/// before bucketing, so the forecaster never sees rent, transfers, or income
/// pass-throughs.
pub fn daily_series(
    transactions: &[NormalizedTransaction],
    start: NaiveDate,
    end: NaiveDate,
    policy: &ExclusionPolicy,
) -> Result<DailySeries> {
    let span = (end - start).num_days();
    if span < 0 {
        return Err(Error::InvalidData(format!(
            "date range end {} precedes start {}",
            end, start
        )));
    }

    let mut amounts = vec![0.0; span as usize + 1];
    let mut included = 0usize;

    for tx in transactions {
        if policy.excludes_category(&tx.primary_category) {
            continue;
        }
        if tx.date < start || tx.date > end {
            continue;
        }
        let idx = (tx.date - start).num_days() as usize;
        amounts[idx] += tx.amount;
        included += 1;
    }

    debug!(
        days = amounts.len(),
        transactions = included,
        "Built daily spending series"
    );

    Ok(DailySeries::new(start, amounts))
}

/// Roll spending up by category or merchant.
///
/// Groups come back sorted by total descending; each carries its share of
/// total spending (0 when there is no spending) and its top 3 transactions
/// by amount, ties broken by input order.
pub fn group_spending(
    transactions: &[NormalizedTransaction],
    dimension: GroupBy,
) -> SpendingBreakdown {
    // Insertion-ordered grouping so equal totals keep a stable order
    let mut order: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut members: Vec<Vec<&NormalizedTransaction>> = Vec::new();

    let mut total_spending = 0.0;

    for tx in transactions {
        let key = match dimension {
            GroupBy::Category => tx.primary_category.as_str(),
            GroupBy::Merchant => tx.merchant.as_str(),
        };

        let slot = *index.entry(key.to_string()).or_insert_with(|| {
            order.push(key.to_string());
            members.push(Vec::new());
            members.len() - 1
        });
        members[slot].push(tx);
        total_spending += tx.amount;
    }

    let mut groups: Vec<SpendingGroup> = order
        .into_iter()
        .zip(members)
        .map(|(key, txs)| {
            let total: f64 = txs.iter().map(|t| t.amount).sum();
            let count = txs.len();

            let mut top: Vec<&NormalizedTransaction> = txs.clone();
            top.sort_by(|a, b| {
                b.amount
                    .partial_cmp(&a.amount)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            top.truncate(3);

            SpendingGroup {
                key,
                total,
                count,
                percentage: if total_spending > 0.0 {
                    total / total_spending * 100.0
                } else {
                    0.0
                },
                avg_transaction: if count > 0 { total / count as f64 } else { 0.0 },
                top_transactions: top
                    .into_iter()
                    .map(|t| TransactionSummary {
                        date: t.date,
                        merchant: t.merchant.clone(),
                        amount: t.amount,
                    })
                    .collect(),
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    SpendingBreakdown {
        total_spending,
        groups,
    }
}

/// Minimum number of weekly buckets before a trend direction is claimed
const TREND_MIN_WEEKS: usize = 4;

/// Compare recent weekly spending against the earlier baseline.
///
/// Weeks are Monday-anchored. With fewer than [`TREND_MIN_WEEKS`] buckets the
/// direction is reported as insufficient data rather than guessed.
pub fn weekly_trend(transactions: &[NormalizedTransaction]) -> SpendingTrend {
    let mut weekly: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for tx in transactions {
        let week_start = tx.date - Duration::days(tx.date.weekday().num_days_from_monday() as i64);
        *weekly.entry(week_start).or_insert(0.0) += tx.amount;
    }

    let weekly_totals: Vec<WeeklyTotal> = weekly
        .into_iter()
        .map(|(week_start, total)| WeeklyTotal { week_start, total })
        .collect();

    if weekly_totals.len() < TREND_MIN_WEEKS {
        return SpendingTrend {
            weekly_totals,
            direction: TrendDirection::InsufficientData,
            change_percent: 0.0,
        };
    }

    let split = weekly_totals.len() - 2;
    let recent_avg: f64 = weekly_totals[split..].iter().map(|w| w.total).sum::<f64>() / 2.0;
    let older_avg: f64 =
        weekly_totals[..split].iter().map(|w| w.total).sum::<f64>() / split as f64;

    let direction = if recent_avg > older_avg {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };
    let change_percent = if older_avg > 0.0 {
        (recent_avg - older_avg) / older_avg * 100.0
    } else {
        0.0
    };

    SpendingTrend {
        weekly_totals,
        direction,
        change_percent,
    }
}

/// Largest single expenses, amount descending (ties keep input order)
pub fn biggest_expenses(
    transactions: &[NormalizedTransaction],
    limit: usize,
) -> Vec<TransactionSummary> {
    let mut sorted: Vec<&NormalizedTransaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted
        .into_iter()
        .take(limit)
        .map(|t| TransactionSummary {
            date: t.date,
            merchant: t.merchant.clone(),
            amount: t.amount,
        })
        .collect()
}

/// Case-insensitive substring search over merchant and primary category
pub fn search(
    transactions: &[NormalizedTransaction],
    query: &str,
) -> Vec<NormalizedTransaction> {
    let needle = query.to_lowercase();
    transactions
        .iter()
        .filter(|t| {
            t.merchant.to_lowercase().contains(&needle)
                || t.primary_category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
