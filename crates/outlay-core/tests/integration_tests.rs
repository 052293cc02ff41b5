//! Integration tests for outlay-core
//!
//! These tests exercise the full read -> normalize -> detect -> aggregate ->
//! forecast -> evaluate pipeline.

use chrono::{Duration, NaiveDate};

use outlay_core::{
    evaluate_overspend, normalize, read_csv, AlertSeverity, AnalysisEngine, Collaborators,
    ExclusionPolicy, ForecastMethod, Forecaster, Frequency, GroupBy, RecurrenceDetector,
};

/// CSV with two clean subscriptions, a rent autopay that must be excluded,
/// and a payroll deposit that normalization drops.
fn sample_csv() -> &'static str {
    "\
date,amount,description,category
2025-04-05,15.99,NETFLIX.COM,Entertainment > Streaming
2025-05-05,15.99,NETFLIX.COM,Entertainment > Streaming
2025-06-04,15.99,NETFLIX.COM,Entertainment > Streaming
2025-04-12,10.99,SPOTIFY USA,Entertainment > Music
2025-05-12,10.99,SPOTIFY USA,Entertainment > Music
2025-06-11,10.99,SPOTIFY USA,Entertainment > Music
2025-04-01,1800.00,OAKWOOD RENT AUTOPAY,RENT_AND_UTILITIES
2025-05-01,1800.00,OAKWOOD RENT AUTOPAY,RENT_AND_UTILITIES
2025-06-01,1800.00,OAKWOOD RENT AUTOPAY,RENT_AND_UTILITIES
2025-04-15,-2500.00,ACME PAYROLL,INCOME
"
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
}

#[test]
fn test_csv_to_subscriptions() {
    let raw = read_csv(sample_csv().as_bytes()).unwrap();
    assert_eq!(raw.len(), 10);

    let transactions = normalize(&raw).unwrap();
    // Payroll deposit is income and never survives normalization
    assert_eq!(transactions.len(), 9);

    let detector = RecurrenceDetector::new();
    let subscriptions = detector.detect(&transactions, today());

    // Rent recurs perfectly but is keyword-excluded
    assert_eq!(subscriptions.len(), 2);
    assert_eq!(subscriptions[0].merchant, "NETFLIX.COM");
    assert_eq!(subscriptions[0].frequency, Frequency::Monthly);
    assert_eq!(subscriptions[0].occurrence_count, 3);
    assert_eq!(subscriptions[1].merchant, "SPOTIFY USA");
    assert!(subscriptions[1].next_charge.unwrap() > today());
}

#[test]
fn test_pipeline_excludes_rent_from_forecast_series() {
    let raw = read_csv(sample_csv().as_bytes()).unwrap();
    let transactions = normalize(&raw).unwrap();

    let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();

    let series =
        outlay_core::daily_series(&transactions, start, end, &ExclusionPolicy::default()).unwrap();

    assert_eq!(series.len(), (end - start).num_days() as usize + 1);
    // Rent days carry zero; subscription days carry their charges
    assert_eq!(series.amounts[0], 0.0);
    let netflix_idx = (NaiveDate::from_ymd_opt(2025, 4, 5).unwrap() - start).num_days() as usize;
    assert!((series.amounts[netflix_idx] - 15.99).abs() < 1e-9);

    let total: f64 = series.amounts.iter().sum();
    assert!((total - (3.0 * 15.99 + 3.0 * 10.99)).abs() < 1e-9);
}

#[test]
fn test_forecast_and_alerts_end_to_end() {
    // Build ~10 weeks of steady discretionary spending
    let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
    let mut csv = String::from("date,amount,description,category\n");
    for i in 0..70 {
        let date = start + Duration::days(i);
        csv.push_str(&format!("{},25.00,CORNER MARKET,Food\n", date.format("%Y-%m-%d")));
    }

    let raw = read_csv(csv.as_bytes()).unwrap();
    let transactions = normalize(&raw).unwrap();

    let series = outlay_core::daily_series(
        &transactions,
        start,
        start + Duration::days(69),
        &ExclusionPolicy::default(),
    )
    .unwrap();

    let forecast = Forecaster::new()
        .forecast(&series, 30, ForecastMethod::Seasonal)
        .unwrap();

    assert_eq!(forecast.daily.len(), 30);
    // Steady $25/day should forecast in the right ballpark
    assert!(forecast.total > 500.0 && forecast.total < 1000.0);
    for day in &forecast.daily {
        assert!(day.amount >= 0.0 && day.upper >= day.lower);
    }

    // ~$750 forecast against a $500 balance: both alerts fire
    let alerts = evaluate_overspend(forecast.total, 500.0);
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    assert_eq!(alerts[1].severity, AlertSeverity::Warning);
}

#[test]
fn test_engine_run_over_csv_batch() {
    let raw = read_csv(sample_csv().as_bytes()).unwrap();

    let engine = AnalysisEngine::new();
    let report = engine
        .run(&raw, 5_000.0, today(), &Collaborators::default())
        .unwrap();

    assert_eq!(report.subscriptions.len(), 2);
    assert!((report.total_monthly_cost - (15.99 + 10.99)).abs() < 1e-9);

    // Category rollup still sees rent (grouping is not the exclusion's job)
    let breakdown = &report.breakdown;
    assert_eq!(breakdown.groups[0].key, "RENT_AND_UTILITIES");
    assert!((breakdown.groups[0].percentage
        - breakdown.groups[0].total / breakdown.total_spending * 100.0)
        .abs()
        < 1e-9);
}

#[test]
fn test_group_by_merchant_totals() {
    let raw = read_csv(sample_csv().as_bytes()).unwrap();
    let transactions = normalize(&raw).unwrap();

    let breakdown = outlay_core::group_spending(&transactions, GroupBy::Merchant);

    let netflix = breakdown
        .groups
        .iter()
        .find(|g| g.key == "NETFLIX.COM")
        .unwrap();
    assert_eq!(netflix.count, 3);
    assert!((netflix.total - 47.97).abs() < 1e-9);
}
