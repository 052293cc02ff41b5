//! Outlay Core Library
//!
//! Shared functionality for the Outlay spending analysis tool:
//! - Transaction normalization with a strict malformed-record boundary
//! - Recurring-charge detection and cadence classification
//! - Dense daily spending aggregation with category/merchant rollups
//! - Seasonal daily-spending forecasting with graceful degradation
//! - Overspend alert evaluation against a balance threshold
//! - CSV transaction source
//!
//! Everything is a pure, synchronous computation over in-memory data. The
//! persistence and notification collaborators are traits injected into the
//! [`engine::AnalysisEngine`]; their failures are logged and skipped.

pub mod aggregate;
pub mod alerts;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod models;
pub mod normalize;
pub mod policy;
pub mod recurrence;
pub mod source;

pub use aggregate::{biggest_expenses, daily_series, group_spending, search, weekly_trend};
pub use alerts::evaluate_overspend;
pub use engine::{
    AlertSink, AnalysisEngine, AnalysisReport, Collaborators, ForecastStore, SubscriptionStore,
};
pub use error::{Error, Result};
pub use forecast::{Forecaster, MIN_HISTORY_DAYS};
pub use models::{
    Alert, AlertSeverity, Confidence, DailyPrediction, DailySeries, ForecastMethod,
    ForecastResult, Frequency, GroupBy, NormalizedTransaction, RawTransaction, SpendingBreakdown,
    SpendingGroup, SpendingTrend, Subscription, TransactionSummary, TrendDirection, WeeklyTotal,
};
pub use normalize::normalize;
pub use policy::{AnalysisConfig, ExclusionPolicy};
pub use recurrence::RecurrenceDetector;
pub use source::{read_csv, read_csv_file};
