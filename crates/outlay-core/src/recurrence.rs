//! Recurring-charge detection
//!
//! Groups expense transactions into candidate series by merchant and amount,
//! measures the gaps between occurrences, and classifies cadence. Rent,
//! credit-card payments, and transfer-like merchants are policy-excluded
//! regardless of how regular they look.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{Frequency, NormalizedTransaction, Subscription};
use crate::policy::AnalysisConfig;

/// Relative amount drift tolerated inside one charge cluster. Real
/// subscriptions price consistently; wider drift means regular shopping.
const AMOUNT_DRIFT: f64 = 0.05;

/// A candidate recurring series before classification
struct CandidateSeries<'a> {
    merchant: &'a str,
    /// Occurrences sorted by date ascending
    occurrences: Vec<&'a NormalizedTransaction>,
}

impl CandidateSeries<'_> {
    /// Day gaps between consecutive occurrences
    fn interval_days(&self) -> Vec<i64> {
        self.occurrences
            .windows(2)
            .map(|w| (w[1].date - w[0].date).num_days())
            .collect()
    }
}

/// Detects recurring subscriptions from normalized expense transactions
pub struct RecurrenceDetector {
    config: AnalysisConfig,
}

impl Default for RecurrenceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RecurrenceDetector {
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Detect subscriptions in a transaction set.
    ///
    /// `today` anchors the next-charge projection; it is injected rather than
    /// read from the wall clock so runs are reproducible. Returns an empty
    /// vector (not an error) when nothing qualifies.
    pub fn detect(
        &self,
        transactions: &[NormalizedTransaction],
        today: NaiveDate,
    ) -> Vec<Subscription> {
        let mut subscriptions = Vec::new();

        for series in self.build_candidates(transactions) {
            if series.occurrences.len() < self.config.min_occurrences {
                continue;
            }

            if self.config.exclusion.excludes_merchant(series.merchant) {
                debug!(merchant = series.merchant, "Skipping policy-excluded merchant");
                continue;
            }

            let intervals = series.interval_days();
            let (frequency, avg_interval) = classify_cadence(&intervals);

            let (first, last) = match (series.occurrences.first(), series.occurrences.last()) {
                (Some(first), Some(last)) => (first, last),
                _ => continue,
            };

            subscriptions.push(Subscription {
                merchant: series.merchant.to_string(),
                amount: first.amount,
                frequency,
                occurrence_count: series.occurrences.len(),
                first_charge: first.date,
                last_charge: last.date,
                avg_interval_days: avg_interval,
                next_charge: Subscription::project_next_charge(last.date, frequency, today),
            });

            debug!(
                merchant = series.merchant,
                amount = first.amount,
                frequency = %frequency,
                "Found subscription"
            );
        }

        // Largest charges first; sort_by is stable so ties keep input order
        subscriptions.sort_by(|a, b| {
            b.amount
                .partial_cmp(&a.amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        subscriptions
    }

    /// Group transactions by merchant, then split each merchant's charges
    /// into amount clusters. A cluster accepts an amount when it sits within
    /// [`AMOUNT_DRIFT`] of the cluster's first amount and the cluster still
    /// holds at most `amount_tolerance_count` distinct raw amounts.
    fn build_candidates<'a>(
        &self,
        transactions: &'a [NormalizedTransaction],
    ) -> Vec<CandidateSeries<'a>> {
        let mut by_merchant: HashMap<&str, Vec<&NormalizedTransaction>> = HashMap::new();
        for tx in transactions {
            if self.config.exclusion.excludes_category(&tx.primary_category) {
                continue;
            }
            by_merchant.entry(tx.merchant.as_str()).or_default().push(tx);
        }

        let mut candidates = Vec::new();

        // Deterministic iteration keeps tie ordering stable across runs
        let mut merchants: Vec<_> = by_merchant.into_iter().collect();
        merchants.sort_by_key(|(m, _)| *m);

        for (merchant, txs) in merchants {
            let mut clusters: Vec<AmountCluster<'_>> = Vec::new();

            for tx in txs {
                let cents = to_cents(tx.amount);
                let joined = clusters.iter_mut().any(|cluster| {
                    if !cluster.accepts(tx.amount, cents, self.config.amount_tolerance_count) {
                        return false;
                    }
                    cluster.push(tx, cents);
                    true
                });

                if !joined {
                    clusters.push(AmountCluster::seed(tx, cents));
                }
            }

            for cluster in clusters {
                let mut occurrences = cluster.members;
                occurrences.sort_by_key(|t| t.date);
                candidates.push(CandidateSeries {
                    merchant,
                    occurrences,
                });
            }
        }

        candidates
    }
}

/// A merchant's charges that share (nearly) one amount
struct AmountCluster<'a> {
    representative: f64,
    distinct_cents: Vec<i64>,
    members: Vec<&'a NormalizedTransaction>,
}

impl<'a> AmountCluster<'a> {
    fn seed(tx: &'a NormalizedTransaction, cents: i64) -> Self {
        Self {
            representative: tx.amount,
            distinct_cents: vec![cents],
            members: vec![tx],
        }
    }

    fn accepts(&self, amount: f64, cents: i64, tolerance_count: usize) -> bool {
        if self.representative < 0.01 {
            return cents == 0;
        }
        let drift = (amount - self.representative).abs() / self.representative;
        if drift >= AMOUNT_DRIFT {
            return false;
        }
        self.distinct_cents.contains(&cents) || self.distinct_cents.len() < tolerance_count
    }

    fn push(&mut self, tx: &'a NormalizedTransaction, cents: i64) {
        if !self.distinct_cents.contains(&cents) {
            self.distinct_cents.push(cents);
        }
        self.members.push(tx);
    }
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Classify cadence from a sequence of day gaps.
///
/// Returns the frequency and the mean gap. An empty gap list or a zero mean
/// (duplicate-dated entries) yields [`Frequency::Irregular`] instead of a
/// division by zero or a nonsense "every 0 days" cadence.
fn classify_cadence(intervals: &[i64]) -> (Frequency, f64) {
    if intervals.is_empty() {
        return (Frequency::Irregular, 0.0);
    }

    let avg = intervals.iter().sum::<i64>() as f64 / intervals.len() as f64;
    if avg <= 0.0 {
        return (Frequency::Irregular, avg);
    }

    let frequency = if (25.0..=35.0).contains(&avg) {
        Frequency::Monthly
    } else if (6.0..=8.0).contains(&avg) {
        Frequency::Weekly
    } else if (350.0..=380.0).contains(&avg) {
        Frequency::Yearly
    } else {
        Frequency::Custom {
            avg_days: avg.round() as i64,
        }
    };

    (frequency, avg)
}
