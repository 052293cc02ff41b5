//! Domain models for Outlay

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A transaction as it arrives from a source (CSV export, provider dump).
///
/// Loosely shaped on purpose: the date is still a string and the amount sign
/// convention is whatever the upstream source used. [`crate::normalize`]
/// turns these into [`NormalizedTransaction`]s or rejects the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    pub date: String,
    pub amount: f64,
    pub description: String,
    /// Hierarchical category string ("Food > Coffee > Espresso"), if any
    pub category: Option<String>,
}

/// A validated expense transaction.
///
/// Amount is always non-negative (positive = money leaving the account);
/// income and credits never survive normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    pub date: NaiveDate,
    pub amount: f64,
    pub merchant: String,
    /// First segment of the category hierarchy, "Uncategorized" when absent
    pub primary_category: String,
}

/// Recurrence cadence of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
    /// Regular but outside the known bands; carries the rounded mean gap
    Custom { avg_days: i64 },
    /// No usable interval data (duplicate-dated or single-gap groups)
    Irregular,
}

impl Frequency {
    /// Expected days between charges, used to project the next charge date
    pub fn interval_days(&self) -> Option<i64> {
        match self {
            Self::Weekly => Some(7),
            Self::Monthly => Some(30),
            Self::Yearly => Some(365),
            Self::Custom { avg_days } => Some((*avg_days).max(1)),
            Self::Irregular => None,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
            Self::Custom { avg_days } => write!(f, "every {} days", avg_days),
            Self::Irregular => write!(f, "irregular"),
        }
    }
}

/// A detected recurring charge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub merchant: String,
    /// Representative amount (the first occurrence's)
    pub amount: f64,
    pub frequency: Frequency,
    pub occurrence_count: usize,
    pub first_charge: NaiveDate,
    pub last_charge: NaiveDate,
    /// Mean gap between consecutive charges, in days
    pub avg_interval_days: f64,
    /// Projected next charge date, None for irregular cadences
    pub next_charge: Option<NaiveDate>,
}

impl Subscription {
    /// Project the next charge date from the last charge and cadence,
    /// advanced until it lands strictly after `today`.
    pub fn project_next_charge(
        last_charge: NaiveDate,
        frequency: Frequency,
        today: NaiveDate,
    ) -> Option<NaiveDate> {
        let interval = frequency.interval_days()?;
        let mut next = last_charge + Duration::days(interval);
        while next <= today {
            next += Duration::days(interval);
        }
        Some(next)
    }

    /// Monthly cost contribution, for rollups across mixed cadences
    pub fn monthly_cost(&self) -> f64 {
        match self.frequency {
            Frequency::Weekly => self.amount * 30.0 / 7.0,
            Frequency::Monthly => self.amount,
            Frequency::Yearly => self.amount / 12.0,
            Frequency::Custom { avg_days } if avg_days > 0 => {
                self.amount * 30.0 / avg_days as f64
            }
            _ => 0.0,
        }
    }
}

/// A dense daily spending series: one amount per calendar day, no gaps.
///
/// Construct through [`crate::aggregate::daily_series`], which guarantees the
/// length invariant `(end - start).days + 1` with zero-fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub start: NaiveDate,
    pub amounts: Vec<f64>,
}

impl DailySeries {
    pub fn new(start: NaiveDate, amounts: Vec<f64>) -> Self {
        Self { start, amounts }
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Last date covered by the series
    pub fn end(&self) -> Option<NaiveDate> {
        if self.amounts.is_empty() {
            None
        } else {
            Some(self.start + Duration::days(self.amounts.len() as i64 - 1))
        }
    }

    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }

    /// (date, amount) pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| (self.date_at(i), a))
    }
}

/// Forecasting method selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    /// Historical mean daily amount
    Average,
    /// Linear regression on day index
    Trend,
    /// Per-weekday historical means
    WeeklyPattern,
    /// Multiplicative seasonal decomposition (the primary path)
    #[default]
    Seasonal,
}

impl ForecastMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Trend => "trend",
            Self::WeeklyPattern => "weekly_pattern",
            Self::Seasonal => "seasonal",
        }
    }
}

impl std::str::FromStr for ForecastMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "average" => Ok(Self::Average),
            "trend" => Ok(Self::Trend),
            "weekly_pattern" | "weekly-pattern" | "weekly" => Ok(Self::WeeklyPattern),
            "seasonal" => Ok(Self::Seasonal),
            _ => Err(format!("Unknown forecast method: {}", s)),
        }
    }
}

impl std::fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Forecast confidence label, driven purely by history length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
        }
    }
}

/// One forecasted day: point estimate plus an 80%-width interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPrediction {
    pub date: NaiveDate,
    /// Point estimate, clipped at zero
    pub amount: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Point-estimate total for one contiguous 7-day window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyTotal {
    pub week_start: NaiveDate,
    pub total: f64,
}

/// Output of a forecast run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub horizon_days: u32,
    /// Method actually used (may differ from the request after degradation)
    pub method: ForecastMethod,
    pub daily: Vec<DailyPrediction>,
    /// Sum of all point estimates over the horizon
    pub total: f64,
    pub weekly: Vec<WeeklyTotal>,
    pub confidence: Confidence,
}

/// Dimension for spending rollups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Category,
    Merchant,
}

impl std::str::FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "category" => Ok(Self::Category),
            "merchant" => Ok(Self::Merchant),
            _ => Err(format!("Unknown grouping dimension: {}", s)),
        }
    }
}

/// Condensed transaction for group top-3 listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub date: NaiveDate,
    pub merchant: String,
    pub amount: f64,
}

/// One rollup group (a category or a merchant)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingGroup {
    pub key: String,
    pub total: f64,
    pub count: usize,
    /// Share of total spending, 0 when there is no spending at all
    pub percentage: f64,
    pub avg_transaction: f64,
    /// Top 3 by amount, ties broken by input order
    pub top_transactions: Vec<TransactionSummary>,
}

/// Spending rollup across one dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingBreakdown {
    pub total_spending: f64,
    /// Groups sorted by total, descending
    pub groups: Vec<SpendingGroup>,
}

/// Week-over-week trend direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    InsufficientData,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

/// Weekly spending totals with a direction estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingTrend {
    /// Monday-anchored weekly totals, chronological
    pub weekly_totals: Vec<WeeklyTotal>,
    pub direction: TrendDirection,
    /// Percent change of the last two weeks vs the earlier baseline
    pub change_percent: f64,
}

/// Overspend alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// An alert produced by the overspend evaluator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_display() {
        assert_eq!(Frequency::Monthly.to_string(), "monthly");
        assert_eq!(Frequency::Custom { avg_days: 12 }.to_string(), "every 12 days");
        assert_eq!(Frequency::Irregular.to_string(), "irregular");
    }

    #[test]
    fn test_project_next_charge_advances_past_today() {
        let last = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();

        let next = Subscription::project_next_charge(last, Frequency::Monthly, today).unwrap();
        assert!(next > today);
        assert!(next <= today + Duration::days(30));
    }

    #[test]
    fn test_project_next_charge_irregular() {
        let last = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();

        assert_eq!(
            Subscription::project_next_charge(last, Frequency::Irregular, today),
            None
        );
    }

    #[test]
    fn test_monthly_cost_rollup() {
        let sub = Subscription {
            merchant: "GYM".to_string(),
            amount: 120.0,
            frequency: Frequency::Yearly,
            occurrence_count: 2,
            first_charge: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            last_charge: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            avg_interval_days: 366.0,
            next_charge: None,
        };
        assert!((sub.monthly_cost() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_daily_series_dates() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let series = DailySeries::new(start, vec![1.0, 2.0, 3.0]);

        assert_eq!(series.len(), 3);
        assert_eq!(series.end(), Some(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()));
        assert_eq!(series.date_at(1), NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
    }
}
