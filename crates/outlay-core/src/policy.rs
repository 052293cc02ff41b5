//! Shared exclusion policy and analysis configuration
//!
//! The aggregator and the recurrence detector must agree on what counts as
//! discretionary spending. Both take the same [`ExclusionPolicy`] value so
//! the two can never drift apart.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::ForecastMethod;

/// Category codes excluded from spending analysis: transfers, income, and
/// non-discretionary fixed payments.
const EXCLUDED_CATEGORIES: &[&str] = &[
    "TRANSFER_IN",
    "TRANSFER_OUT",
    "INCOME",
    "CREDIT_CARD_PAYMENT",
    "RENT_AND_UTILITIES",
];

/// Merchant-name substrings that disqualify a recurring charge from being
/// called a subscription.
const EXCLUDED_MERCHANT_KEYWORDS: &[&str] = &["RENT", "CREDIT CARD", "TRANSFER", "PAYMENT"];

/// Categories and merchant keywords that disqualify transactions from
/// forecasts and subscription classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionPolicy {
    /// Primary category codes to drop before aggregation and forecasting
    pub categories: HashSet<String>,
    /// Uppercase substrings that mark a merchant as not-a-subscription
    pub merchant_keywords: Vec<String>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            categories: EXCLUDED_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            merchant_keywords: EXCLUDED_MERCHANT_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ExclusionPolicy {
    /// An empty policy that excludes nothing (for tests and raw rollups)
    pub fn none() -> Self {
        Self {
            categories: HashSet::new(),
            merchant_keywords: Vec::new(),
        }
    }

    pub fn excludes_category(&self, primary_category: &str) -> bool {
        self.categories.contains(primary_category)
    }

    /// Case-insensitive substring match against the keyword list
    pub fn excludes_merchant(&self, merchant: &str) -> bool {
        let upper = merchant.to_uppercase();
        self.merchant_keywords
            .iter()
            .any(|kw| upper.contains(kw.as_str()))
    }
}

/// Analysis configuration
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Minimum occurrences before a charge group can become a subscription
    pub min_occurrences: usize,
    /// Maximum distinct raw amounts tolerated within one charge group (1 or 2)
    pub amount_tolerance_count: usize,
    /// Days to forecast ahead
    pub horizon_days: u32,
    pub forecast_method: ForecastMethod,
    pub exclusion: ExclusionPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 2,
            amount_tolerance_count: 2,
            horizon_days: 30,
            forecast_method: ForecastMethod::Seasonal,
            exclusion: ExclusionPolicy::default(),
        }
    }
}
