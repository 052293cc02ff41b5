//! Overspend evaluation
//!
//! Compares a forecast total against the available balance and emits alert
//! conditions. The two thresholds are independent: a forecast above the full
//! balance fires both the critical and the warning alert.

use tracing::debug;

use crate::models::{Alert, AlertSeverity};

/// Evaluate a forecast total against a balance threshold.
///
/// - critical when the forecast exceeds the balance outright
/// - warning when the forecast exceeds half the balance
pub fn evaluate_overspend(forecast_total: f64, balance: f64) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if forecast_total > balance {
        alerts.push(Alert {
            severity: AlertSeverity::Critical,
            message: format!(
                "Overspending ahead: forecasted ${:.2} exceeds your ${:.2} balance",
                forecast_total, balance
            ),
        });
    }

    if forecast_total > balance / 2.0 {
        alerts.push(Alert {
            severity: AlertSeverity::Warning,
            message: format!(
                "Forecasted spending ${:.2} is over half your ${:.2} balance",
                forecast_total, balance
            ),
        });
    }

    debug!(
        forecast_total,
        balance,
        alerts = alerts.len(),
        "Evaluated overspend thresholds"
    );

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_balance_fires_both() {
        let alerts = evaluate_overspend(600.0, 500.0);

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[1].severity, AlertSeverity::Warning);
    }

    #[test]
    fn test_under_half_balance_fires_none() {
        assert!(evaluate_overspend(200.0, 500.0).is_empty());
    }

    #[test]
    fn test_between_thresholds_fires_warning_only() {
        let alerts = evaluate_overspend(260.0, 500.0);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);
    }

    #[test]
    fn test_exactly_half_balance_is_quiet() {
        assert!(evaluate_overspend(250.0, 500.0).is_empty());
    }
}
