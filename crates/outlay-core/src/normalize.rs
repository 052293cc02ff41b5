//! Transaction normalization
//!
//! Maps raw source records into validated expense transactions. This is the
//! only boundary where malformed input is allowed to surface: detection and
//! forecasting downstream assume every record is well-formed.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{NormalizedTransaction, RawTransaction};

/// Separator used by upstream sources for hierarchical categories
const CATEGORY_SEPARATOR: &str = " > ";

/// Fallback category for transactions the source left unlabeled
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Normalize a batch of raw transactions into expense records.
///
/// Sign convention: positive = money leaving the account. Income and credits
/// (amount <= 0) are filtered out, which is not an error. A record with an
/// unparseable date or a non-finite amount fails the whole call: silently
/// dropping part of a batch would skew every downstream number.
pub fn normalize(raw: &[RawTransaction]) -> Result<Vec<NormalizedTransaction>> {
    let mut out = Vec::with_capacity(raw.len());

    for tx in raw {
        let date = parse_date(&tx.date)
            .ok_or_else(|| Error::MalformedRecord(format!("unparseable date {:?}", tx.date)))?;

        if !tx.amount.is_finite() {
            return Err(Error::MalformedRecord(format!(
                "non-finite amount for {:?} on {}",
                tx.description, tx.date
            )));
        }

        // Negative / zero amounts are income or credits, not expenses
        if tx.amount <= 0.0 {
            continue;
        }

        out.push(NormalizedTransaction {
            date,
            amount: tx.amount.abs(),
            merchant: tx.description.trim().to_string(),
            primary_category: primary_category(tx.category.as_deref()),
        });
    }

    debug!(
        input = raw.len(),
        expenses = out.len(),
        "Normalized transaction batch"
    );

    Ok(out)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// First segment of a hierarchical category string
fn primary_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c
            .split(CATEGORY_SEPARATOR)
            .next()
            .unwrap_or(UNCATEGORIZED)
            .trim()
            .to_string(),
        _ => UNCATEGORIZED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, amount: f64, desc: &str, category: Option<&str>) -> RawTransaction {
        RawTransaction {
            date: date.to_string(),
            amount,
            description: desc.to_string(),
            category: category.map(|c| c.to_string()),
        }
    }

    #[test]
    fn test_expenses_only_and_non_negative() {
        let input = vec![
            raw("2025-06-01", 15.99, "NETFLIX.COM", Some("Entertainment")),
            raw("2025-06-02", -2500.0, "PAYROLL DEPOSIT", Some("INCOME")),
            raw("2025-06-03", 0.0, "BALANCE ADJUSTMENT", None),
            raw("2025-06-04", 42.10, "TRADER JOES", Some("Food > Groceries")),
        ];

        let normalized = normalize(&input).unwrap();
        assert_eq!(normalized.len(), 2);
        assert!(normalized.iter().all(|t| t.amount > 0.0));
        assert_eq!(normalized[0].merchant, "NETFLIX.COM");
        assert_eq!(normalized[1].amount, 42.10);
    }

    #[test]
    fn test_primary_category_split() {
        let input = vec![raw(
            "2025-06-04",
            8.50,
            "BLUE BOTTLE",
            Some("Food > Coffee > Espresso"),
        )];

        let normalized = normalize(&input).unwrap();
        assert_eq!(normalized[0].primary_category, "Food");
    }

    #[test]
    fn test_missing_category_defaults() {
        let input = vec![raw("2025-06-04", 8.50, "BLUE BOTTLE", None)];

        let normalized = normalize(&input).unwrap();
        assert_eq!(normalized[0].primary_category, UNCATEGORIZED);
    }

    #[test]
    fn test_malformed_date_fails_whole_batch() {
        let input = vec![
            raw("2025-06-01", 15.99, "NETFLIX.COM", None),
            raw("06/02/2025", 10.00, "SPOTIFY", None),
        ];

        let err = normalize(&input).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord(_)));
    }

    #[test]
    fn test_non_finite_amount_fails() {
        let input = vec![raw("2025-06-01", f64::NAN, "GLITCH", None)];

        let err = normalize(&input).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord(_)));
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize(&[]).unwrap().is_empty());
    }
}
