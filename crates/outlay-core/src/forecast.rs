//! Daily-spending forecasting
//!
//! Projects a dense daily series over a configurable horizon. Four methods:
//! historical mean, linear trend, per-weekday pattern, and the primary
//! seasonal path (piecewise-linear trend with changepoints, multiplicative
//! weekly factors, a Fourier monthly component at period 30.5, and yearly
//! factors once a full year of history exists).
//!
//! Numerical fitting failures never surface: a degenerate fit degrades to the
//! average method. The only expected failure is too little history.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{
    Confidence, DailyPrediction, DailySeries, ForecastMethod, ForecastResult, WeeklyTotal,
};

/// Minimum days of history before any forecast is attempted
pub const MIN_HISTORY_DAYS: usize = 14;

/// History length at which the confidence label moves from low to medium
const MEDIUM_CONFIDENCE_DAYS: usize = 30;

/// Two-sided 80% normal quantile, for the uncertainty interval width
const INTERVAL_Z: f64 = 1.2816;

/// Changepoint candidates for the piecewise-linear trend
const MAX_CHANGEPOINTS: usize = 10;

/// Fourier order for the monthly (30.5-day) seasonality component
const MONTHLY_FOURIER_ORDER: usize = 5;

/// Fourier order for the yearly component (only fit with >= 365 days)
const YEARLY_FOURIER_ORDER: usize = 3;

const MONTHLY_PERIOD: f64 = 30.5;
const YEARLY_PERIOD: f64 = 365.25;

/// Spending forecaster over a dense daily series
pub struct Forecaster {
    /// Trend flexibility: lower values penalize changepoint slope shifts
    /// harder (ridge weight is the reciprocal)
    changepoint_scale: f64,
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Forecaster {
    pub fn new() -> Self {
        Self {
            changepoint_scale: 0.05,
        }
    }

    pub fn with_changepoint_scale(changepoint_scale: f64) -> Self {
        Self { changepoint_scale }
    }

    /// Forecast `horizon_days` past the end of `series` using `method`.
    ///
    /// Fails with [`Error::InsufficientHistory`] below [`MIN_HISTORY_DAYS`]
    /// days of history. Every point estimate and interval bound in the result
    /// is clipped at zero.
    pub fn forecast(
        &self,
        series: &DailySeries,
        horizon_days: u32,
        method: ForecastMethod,
    ) -> Result<ForecastResult> {
        if horizon_days == 0 {
            return Err(Error::InvalidData("forecast horizon must be >= 1".into()));
        }
        if series.len() < MIN_HISTORY_DAYS {
            return Err(Error::InsufficientHistory {
                days: series.len(),
                required: MIN_HISTORY_DAYS,
            });
        }

        let horizon = horizon_days as usize;
        let (fit, used) = match method {
            ForecastMethod::Average => (fit_average(series, horizon), method),
            ForecastMethod::Trend => (fit_trend(series, horizon), method),
            ForecastMethod::WeeklyPattern => (fit_weekly_pattern(series, horizon), method),
            ForecastMethod::Seasonal => match self.fit_seasonal(series, horizon) {
                Some(fit) => (fit, method),
                None => {
                    warn!("Seasonal fit degenerate, degrading to average method");
                    (fit_average(series, horizon), ForecastMethod::Average)
                }
            },
        };

        let sigma = residual_sigma(&series.amounts, &fit.history);
        // First forecast day follows the last observed one
        let first = series.date_at(series.len());

        let daily: Vec<DailyPrediction> = fit
            .future
            .iter()
            .enumerate()
            .map(|(k, &point)| {
                let point = point.max(0.0);
                DailyPrediction {
                    date: first + Duration::days(k as i64),
                    amount: point,
                    lower: (point - INTERVAL_Z * sigma).max(0.0),
                    upper: (point + INTERVAL_Z * sigma).max(0.0),
                }
            })
            .collect();

        let total: f64 = daily.iter().map(|d| d.amount).sum();
        let weekly: Vec<WeeklyTotal> = daily
            .chunks(7)
            .map(|week| WeeklyTotal {
                week_start: week[0].date,
                total: week.iter().map(|d| d.amount).sum(),
            })
            .collect();

        let confidence = if series.len() >= MEDIUM_CONFIDENCE_DAYS {
            Confidence::Medium
        } else {
            Confidence::Low
        };

        debug!(
            method = used.as_str(),
            horizon = horizon_days,
            total,
            "Forecast complete"
        );

        Ok(ForecastResult {
            horizon_days,
            method: used,
            daily,
            total,
            weekly,
            confidence,
        })
    }

    /// Multiplicative seasonal decomposition.
    ///
    /// Stages: (1) piecewise-linear trend with ridge-penalized changepoint
    /// deltas; (2) weekly factors from per-weekday mean ratios; (3) monthly
    /// Fourier component fit to what the weekly factors leave over; (4)
    /// yearly Fourier component when a full year of history exists.
    /// Returns None whenever the fit is unusable, which callers treat as the
    /// signal to degrade.
    fn fit_seasonal(&self, series: &DailySeries, horizon: usize) -> Option<ModelFit> {
        let n = series.len();
        let y = &series.amounts;

        let trend = fit_piecewise_trend(y, self.changepoint_scale)?;
        let g: Vec<f64> = (0..n + horizon).map(|t| trend.value(t as f64)).collect();

        // Ratios of observed to trend, the raw material for the factors
        let mut ratios: Vec<Option<f64>> = vec![None; n];
        let mut usable = 0;
        for t in 0..n {
            if g[t].abs() > 1e-9 {
                ratios[t] = Some(y[t] / g[t]);
                usable += 1;
            }
        }
        if usable < 7 {
            return None; // Effectively a zero series, nothing to decompose
        }

        // Weekly factors: mean ratio per weekday, normalized to mean 1
        let mut sums = [0.0f64; 7];
        let mut counts = [0usize; 7];
        for (t, ratio) in ratios.iter().enumerate() {
            if let Some(r) = ratio {
                let wd = series.date_at(t).weekday().num_days_from_monday() as usize;
                sums[wd] += r;
                counts[wd] += 1;
            }
        }
        let mut weekly = [1.0f64; 7];
        for wd in 0..7 {
            if counts[wd] > 0 {
                weekly[wd] = (sums[wd] / counts[wd] as f64).max(0.0);
            }
        }
        let weekly_mean = weekly.iter().sum::<f64>() / 7.0;
        if weekly_mean > 1e-9 {
            for w in weekly.iter_mut() {
                *w /= weekly_mean;
            }
        }

        // Monthly component: Fourier fit to the ratio left after weekly
        let monthly = fit_fourier(
            &ratio_residuals(series, &ratios, &weekly, None),
            MONTHLY_PERIOD,
            MONTHLY_FOURIER_ORDER,
        )?;

        // Yearly component only with a full cycle of data
        let yearly = if n >= 365 {
            Some(fit_fourier(
                &ratio_residuals(series, &ratios, &weekly, Some(&monthly)),
                YEARLY_PERIOD,
                YEARLY_FOURIER_ORDER,
            )?)
        } else {
            None
        };

        let composed = |t: usize| -> f64 {
            let wd = series.date_at(t).weekday().num_days_from_monday() as usize;
            let mut factor = weekly[wd] * (1.0 + monthly.value(t as f64)).max(0.0);
            if let Some(yr) = &yearly {
                factor *= (1.0 + yr.value(t as f64)).max(0.0);
            }
            g[t] * factor
        };

        let history: Vec<f64> = (0..n).map(&composed).collect();
        let future: Vec<f64> = (n..n + horizon).map(&composed).collect();

        if history.iter().chain(future.iter()).any(|v| !v.is_finite()) {
            return None;
        }

        Some(ModelFit { history, future })
    }
}

/// Fitted values over the observed range plus projected future values
struct ModelFit {
    history: Vec<f64>,
    future: Vec<f64>,
}

fn fit_average(series: &DailySeries, horizon: usize) -> ModelFit {
    let mean = series.amounts.iter().sum::<f64>() / series.len() as f64;
    ModelFit {
        history: vec![mean; series.len()],
        future: vec![mean; horizon],
    }
}

fn fit_trend(series: &DailySeries, horizon: usize) -> ModelFit {
    let n = series.len();
    let y = &series.amounts;

    let x_mean = (n as f64 - 1.0) / 2.0;
    let y_mean = y.iter().sum::<f64>() / n as f64;
    let mut cov = 0.0;
    let mut var = 0.0;
    for (i, &v) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        cov += dx * (v - y_mean);
        var += dx * dx;
    }
    let slope = if var > 0.0 { cov / var } else { 0.0 };
    let intercept = y_mean - slope * x_mean;

    ModelFit {
        history: (0..n).map(|t| intercept + slope * t as f64).collect(),
        future: (n..n + horizon)
            .map(|t| intercept + slope * t as f64)
            .collect(),
    }
}

fn fit_weekly_pattern(series: &DailySeries, horizon: usize) -> ModelFit {
    let n = series.len();
    let overall_mean = series.amounts.iter().sum::<f64>() / n as f64;

    let mut sums = [0.0f64; 7];
    let mut counts = [0usize; 7];
    for (t, &v) in series.amounts.iter().enumerate() {
        let wd = series.date_at(t).weekday().num_days_from_monday() as usize;
        sums[wd] += v;
        counts[wd] += 1;
    }
    let by_weekday: Vec<f64> = (0..7)
        .map(|wd| {
            if counts[wd] > 0 {
                sums[wd] / counts[wd] as f64
            } else {
                overall_mean
            }
        })
        .collect();

    let value = |t: usize| {
        let wd = series.date_at(t).weekday().num_days_from_monday() as usize;
        by_weekday[wd]
    };

    ModelFit {
        history: (0..n).map(value).collect(),
        future: (n..n + horizon).map(value).collect(),
    }
}

/// Piecewise-linear trend: base slope plus ridge-penalized slope deltas at
/// evenly spaced changepoints over the first 80% of the history.
struct PiecewiseTrend {
    intercept: f64,
    slope: f64,
    /// (changepoint location, slope delta) pairs
    deltas: Vec<(f64, f64)>,
}

impl PiecewiseTrend {
    fn value(&self, t: f64) -> f64 {
        let mut v = self.intercept + self.slope * t;
        for &(s, delta) in &self.deltas {
            if t > s {
                v += delta * (t - s);
            }
        }
        v
    }
}

fn fit_piecewise_trend(y: &[f64], changepoint_scale: f64) -> Option<PiecewiseTrend> {
    let n = y.len();
    let n_changepoints = MAX_CHANGEPOINTS.min(n / 7);
    let cutoff = 0.8 * n as f64;
    let changepoints: Vec<f64> = (1..=n_changepoints)
        .map(|j| cutoff * j as f64 / (n_changepoints + 1) as f64)
        .collect();

    // Columns: intercept, t, then one hinge per changepoint
    let p = 2 + changepoints.len();
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|t| {
            let tf = t as f64;
            let mut row = Vec::with_capacity(p);
            row.push(1.0);
            row.push(tf);
            for &s in &changepoints {
                row.push((tf - s).max(0.0));
            }
            row
        })
        .collect();

    // Only the hinge columns carry the ridge penalty; the base line is free
    let ridge = 1.0 / changepoint_scale.max(1e-6);
    let mut penalties = vec![0.0; p];
    for pen in penalties.iter_mut().skip(2) {
        *pen = ridge;
    }

    let coef = least_squares(&rows, y, &penalties)?;
    Some(PiecewiseTrend {
        intercept: coef[0],
        slope: coef[1],
        deltas: changepoints.into_iter().zip(coef[2..].to_vec()).collect(),
    })
}

/// A fitted Fourier series over one period
struct FourierComponent {
    period: f64,
    /// (sin, cos) coefficient pairs per harmonic
    coefficients: Vec<(f64, f64)>,
}

impl FourierComponent {
    fn value(&self, t: f64) -> f64 {
        self.coefficients
            .iter()
            .enumerate()
            .map(|(k, &(a, b))| {
                let arg = 2.0 * std::f64::consts::PI * (k + 1) as f64 * t / self.period;
                a * arg.sin() + b * arg.cos()
            })
            .sum()
    }
}

/// Fit Fourier coefficients to sparse (t, target) observations by ordinary
/// least squares.
fn fit_fourier(observations: &[(f64, f64)], period: f64, order: usize) -> Option<FourierComponent> {
    let p = 2 * order;
    if observations.len() <= p {
        return None;
    }

    let rows: Vec<Vec<f64>> = observations
        .iter()
        .map(|&(t, _)| {
            let mut row = Vec::with_capacity(p);
            for k in 1..=order {
                let arg = 2.0 * std::f64::consts::PI * k as f64 * t / period;
                row.push(arg.sin());
                row.push(arg.cos());
            }
            row
        })
        .collect();
    let targets: Vec<f64> = observations.iter().map(|&(_, v)| v).collect();

    // Light ridge keeps near-collinear harmonics from blowing up
    let penalties = vec![1e-3; p];
    let coef = least_squares(&rows, &targets, &penalties)?;

    Some(FourierComponent {
        period,
        coefficients: (0..order).map(|k| (coef[2 * k], coef[2 * k + 1])).collect(),
    })
}

/// What the already-fitted factors leave unexplained, as (t, residual ratio)
/// observations centered on zero.
fn ratio_residuals(
    series: &DailySeries,
    ratios: &[Option<f64>],
    weekly: &[f64; 7],
    monthly: Option<&FourierComponent>,
) -> Vec<(f64, f64)> {
    ratios
        .iter()
        .enumerate()
        .filter_map(|(t, ratio)| {
            let r = (*ratio)?;
            let wd = series.date_at(t).weekday().num_days_from_monday() as usize;
            let mut base = weekly[wd];
            if let Some(m) = monthly {
                base *= (1.0 + m.value(t as f64)).max(0.0);
            }
            if base.abs() > 1e-9 {
                Some((t as f64, r / base - 1.0))
            } else {
                None
            }
        })
        .collect()
}

/// Solve a ridge-penalized least-squares problem via the normal equations
/// with Gaussian elimination. Returns None for singular systems.
fn least_squares(rows: &[Vec<f64>], y: &[f64], penalties: &[f64]) -> Option<Vec<f64>> {
    let p = penalties.len();
    let mut m = vec![vec![0.0f64; p + 1]; p];

    for (row, &target) in rows.iter().zip(y) {
        for i in 0..p {
            for j in 0..p {
                m[i][j] += row[i] * row[j];
            }
            m[i][p] += row[i] * target;
        }
    }
    for i in 0..p {
        m[i][i] += penalties[i];
    }

    // Gaussian elimination with partial pivoting
    for col in 0..p {
        let pivot = (col..p).max_by(|&a, &b| {
            m[a][col]
                .abs()
                .partial_cmp(&m[b][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if m[pivot][col].abs() < 1e-12 {
            return None;
        }
        m.swap(col, pivot);

        for r in col + 1..p {
            let factor = m[r][col] / m[col][col];
            for c in col..=p {
                m[r][c] -= factor * m[col][c];
            }
        }
    }

    let mut coef = vec![0.0f64; p];
    for i in (0..p).rev() {
        let mut v = m[i][p];
        for j in i + 1..p {
            v -= m[i][j] * coef[j];
        }
        coef[i] = v / m[i][i];
        if !coef[i].is_finite() {
            return None;
        }
    }
    Some(coef)
}

/// Standard deviation of the history residuals under the fitted model
fn residual_sigma(observed: &[f64], fitted: &[f64]) -> f64 {
    let n = observed.len().min(fitted.len());
    if n == 0 {
        return 0.0;
    }
    let sq_sum: f64 = observed
        .iter()
        .zip(fitted)
        .map(|(o, f)| (o - f) * (o - f))
        .sum();
    (sq_sum / n as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_from(amounts: Vec<f64>) -> DailySeries {
        DailySeries::new(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(), amounts)
    }

    /// 12 weeks where weekends run hot: Mon..Fri = 10, Sat/Sun = 40
    fn weekend_heavy_series(weeks: usize) -> DailySeries {
        let mut amounts = Vec::new();
        for _ in 0..weeks {
            amounts.extend_from_slice(&[10.0, 10.0, 10.0, 10.0, 10.0, 40.0, 40.0]);
        }
        series_from(amounts) // starts on a Monday
    }

    #[test]
    fn test_insufficient_history() {
        let series = series_from(vec![5.0; 13]);
        let err = Forecaster::new()
            .forecast(&series, 30, ForecastMethod::Seasonal)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::InsufficientHistory {
                days: 13,
                required: 14
            }
        ));
    }

    #[test]
    fn test_average_method_flat_forecast() {
        let series = series_from(vec![20.0; 28]);
        let result = Forecaster::new()
            .forecast(&series, 7, ForecastMethod::Average)
            .unwrap();

        assert_eq!(result.daily.len(), 7);
        for day in &result.daily {
            assert!((day.amount - 20.0).abs() < 1e-9);
        }
        assert!((result.total - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_method_extrapolates() {
        // Linearly rising history keeps rising over the horizon
        let series = series_from((0..30).map(|i| 10.0 + i as f64).collect());
        let result = Forecaster::new()
            .forecast(&series, 5, ForecastMethod::Trend)
            .unwrap();

        assert!(result.daily[0].amount > 38.0);
        assert!(result.daily[4].amount > result.daily[0].amount);
    }

    #[test]
    fn test_weekly_pattern_tracks_weekday() {
        let series = weekend_heavy_series(4);
        let result = Forecaster::new()
            .forecast(&series, 7, ForecastMethod::WeeklyPattern)
            .unwrap();

        // History ends Sunday, so the horizon starts Monday
        assert!((result.daily[0].amount - 10.0).abs() < 1e-9);
        assert!((result.daily[5].amount - 40.0).abs() < 1e-9);
        assert!((result.daily[6].amount - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_seasonal_learns_weekly_shape() {
        let series = weekend_heavy_series(12);
        let result = Forecaster::new()
            .forecast(&series, 14, ForecastMethod::Seasonal)
            .unwrap();

        assert_eq!(result.method, ForecastMethod::Seasonal);
        // Saturday predictions should sit well above Wednesday ones
        let wednesday = result.daily[2].amount;
        let saturday = result.daily[5].amount;
        assert!(
            saturday > wednesday * 1.5,
            "saturday {} not above wednesday {}",
            saturday,
            wednesday
        );
    }

    #[test]
    fn test_forecast_non_negative_everywhere() {
        // Sharply decreasing series would extrapolate negative without clipping
        let series = series_from((0..30).map(|i| (100.0 - 4.0 * i as f64).max(0.0)).collect());

        for method in [
            ForecastMethod::Average,
            ForecastMethod::Trend,
            ForecastMethod::WeeklyPattern,
            ForecastMethod::Seasonal,
        ] {
            let result = Forecaster::new().forecast(&series, 30, method).unwrap();
            for day in &result.daily {
                assert!(day.amount >= 0.0);
                assert!(day.lower >= 0.0);
                assert!(day.upper >= day.lower);
            }
        }
    }

    #[test]
    fn test_all_zero_series_degrades_to_average() {
        let series = series_from(vec![0.0; 60]);
        let result = Forecaster::new()
            .forecast(&series, 14, ForecastMethod::Seasonal)
            .unwrap();

        assert_eq!(result.method, ForecastMethod::Average);
        assert_eq!(result.total, 0.0);
        for day in &result.daily {
            assert_eq!(day.amount, 0.0);
            assert!(day.lower >= 0.0);
            assert!(day.upper >= day.lower);
        }
    }

    #[test]
    fn test_weekly_rollups_partition_horizon() {
        let series = series_from(vec![10.0; 30]);
        let result = Forecaster::new()
            .forecast(&series, 30, ForecastMethod::Average)
            .unwrap();

        // 30 days -> 4 full weeks and a 2-day tail
        assert_eq!(result.weekly.len(), 5);
        assert_eq!(result.weekly[0].week_start, result.daily[0].date);
        assert_eq!(
            result.weekly[1].week_start,
            result.daily[0].date + Duration::days(7)
        );
        assert!((result.weekly[0].total - 70.0).abs() < 1e-9);
        assert!((result.weekly[4].total - 20.0).abs() < 1e-9);

        let weekly_sum: f64 = result.weekly.iter().map(|w| w.total).sum();
        assert!((weekly_sum - result.total).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_label_thresholds() {
        let short = series_from(vec![10.0; 20]);
        let long = series_from(vec![10.0; 45]);
        let forecaster = Forecaster::new();

        let low = forecaster
            .forecast(&short, 7, ForecastMethod::Average)
            .unwrap();
        let medium = forecaster
            .forecast(&long, 7, ForecastMethod::Average)
            .unwrap();

        assert_eq!(low.confidence, Confidence::Low);
        assert_eq!(medium.confidence, Confidence::Medium);
    }

    #[test]
    fn test_forecast_dates_contiguous_after_history() {
        let series = series_from(vec![10.0; 21]);
        let result = Forecaster::new()
            .forecast(&series, 10, ForecastMethod::Average)
            .unwrap();

        let first = result.daily[0].date;
        assert_eq!(first, series.end().unwrap() + Duration::days(1));
        for (k, day) in result.daily.iter().enumerate() {
            assert_eq!(day.date, first + Duration::days(k as i64));
        }
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let series = series_from(vec![10.0; 21]);
        let err = Forecaster::new()
            .forecast(&series, 0, ForecastMethod::Average)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_least_squares_recovers_line() {
        let rows: Vec<Vec<f64>> = (0..20).map(|t| vec![1.0, t as f64]).collect();
        let y: Vec<f64> = (0..20).map(|t| 3.0 + 2.0 * t as f64).collect();

        let coef = least_squares(&rows, &y, &[0.0, 0.0]).unwrap();
        assert!((coef[0] - 3.0).abs() < 1e-6);
        assert!((coef[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_least_squares_singular_returns_none() {
        // Duplicate columns make the system singular without a penalty
        let rows: Vec<Vec<f64>> = (0..10).map(|t| vec![t as f64, t as f64]).collect();
        let y: Vec<f64> = (0..10).map(|t| t as f64).collect();

        assert!(least_squares(&rows, &y, &[0.0, 0.0]).is_none());
    }
}
