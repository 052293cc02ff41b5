//! Analysis engine - wires the pipeline together
//!
//! normalize -> {recurrence detection, spending aggregation} -> forecast ->
//! overspend evaluation. Downstream collaborators (stores, sinks) are
//! injected traits; their failures are logged and skipped so one broken
//! collaborator never aborts the rest of a run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregate::{daily_series, group_spending, weekly_trend};
use crate::alerts::evaluate_overspend;
use crate::error::Result;
use crate::forecast::Forecaster;
use crate::models::{
    Alert, ForecastResult, GroupBy, RawTransaction, SpendingBreakdown, SpendingTrend, Subscription,
};
use crate::normalize::normalize;
use crate::policy::AnalysisConfig;
use crate::recurrence::RecurrenceDetector;

/// Persistence collaborator for detected subscriptions
pub trait SubscriptionStore {
    fn save_subscription(&self, subscription: &Subscription) -> Result<()>;
}

/// Persistence collaborator for forecast runs
pub trait ForecastStore {
    fn save_forecast(&self, forecast: &ForecastResult) -> Result<()>;
}

/// Notification collaborator; delivery details are not the core's concern
pub trait AlertSink {
    fn deliver(&self, alert: &Alert) -> Result<()>;
}

/// Optional downstream collaborators for an analysis run
#[derive(Default)]
pub struct Collaborators<'a> {
    pub subscriptions: Option<&'a dyn SubscriptionStore>,
    pub forecasts: Option<&'a dyn ForecastStore>,
    pub alerts: Option<&'a dyn AlertSink>,
}

/// Everything one analysis run produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub subscriptions: Vec<Subscription>,
    /// Combined monthly cost of the detected subscriptions
    pub total_monthly_cost: f64,
    pub breakdown: SpendingBreakdown,
    pub trend: SpendingTrend,
    /// None when there is not enough history to forecast
    pub forecast: Option<ForecastResult>,
    pub alerts: Vec<Alert>,
}

/// Runs the full analysis pipeline over a raw transaction batch
pub struct AnalysisEngine {
    config: AnalysisConfig,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Run the whole pipeline.
    ///
    /// `today` anchors next-charge projection and is injected for
    /// reproducibility. Only a malformed batch fails the call; a series too
    /// short to forecast leaves `forecast` as None and still reports
    /// subscriptions and spending.
    pub fn run(
        &self,
        raw: &[RawTransaction],
        balance: f64,
        today: NaiveDate,
        collaborators: &Collaborators<'_>,
    ) -> Result<AnalysisReport> {
        let transactions = normalize(raw)?;

        let detector = RecurrenceDetector::with_config(self.config.clone());
        let subscriptions = detector.detect(&transactions, today);
        let total_monthly_cost: f64 = subscriptions.iter().map(|s| s.monthly_cost()).sum();

        if let Some(store) = collaborators.subscriptions {
            for sub in &subscriptions {
                if let Err(e) = store.save_subscription(sub) {
                    warn!(merchant = %sub.merchant, error = %e, "Failed to store subscription");
                }
            }
        }

        let breakdown = group_spending(&transactions, GroupBy::Category);
        let trend = weekly_trend(&transactions);

        let forecast = self.run_forecast(&transactions, collaborators)?;

        let alerts = match &forecast {
            Some(f) => evaluate_overspend(f.total, balance),
            None => Vec::new(),
        };
        if let Some(sink) = collaborators.alerts {
            for alert in &alerts {
                if let Err(e) = sink.deliver(alert) {
                    warn!(severity = alert.severity.as_str(), error = %e, "Failed to deliver alert");
                }
            }
        }

        info!(
            subscriptions = subscriptions.len(),
            alerts = alerts.len(),
            forecast = forecast.is_some(),
            "Analysis run complete"
        );

        Ok(AnalysisReport {
            subscriptions,
            total_monthly_cost,
            breakdown,
            trend,
            forecast,
            alerts,
        })
    }

    /// Build the daily series over the observed date span and forecast it.
    /// Too little history is an expected condition here, not a failure.
    fn run_forecast(
        &self,
        transactions: &[crate::models::NormalizedTransaction],
        collaborators: &Collaborators<'_>,
    ) -> Result<Option<ForecastResult>> {
        let (start, end) = match date_span(transactions) {
            Some(span) => span,
            None => return Ok(None),
        };

        let series = daily_series(transactions, start, end, &self.config.exclusion)?;

        let forecaster = Forecaster::new();
        let forecast = match forecaster.forecast(
            &series,
            self.config.horizon_days,
            self.config.forecast_method,
        ) {
            Ok(f) => f,
            Err(crate::error::Error::InsufficientHistory { days, required }) => {
                info!(days, required, "Not enough history to forecast");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if let Some(store) = collaborators.forecasts {
            if let Err(e) = store.save_forecast(&forecast) {
                warn!(error = %e, "Failed to store forecast");
            }
        }

        Ok(Some(forecast))
    }
}

/// Min and max dates observed in a transaction set
fn date_span(transactions: &[crate::models::NormalizedTransaction]) -> Option<(NaiveDate, NaiveDate)> {
    let min = transactions.iter().map(|t| t.date).min()?;
    let max = transactions.iter().map(|t| t.date).max()?;
    Some((min, max))
}
