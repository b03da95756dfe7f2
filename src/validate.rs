//! Form-input validation shared by every store.
//!
//! All mutating operations take their money and date fields as raw strings,
//! exactly as a form hands them over, and reject anything that does not
//! parse before a statement is prepared.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

// Optional leading minus, up to two decimal places (e.g. 50, 12.34, -10.50, .34).
static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d*\.?\d{0,2}$").expect("amount pattern compiles"));

/// Returns the trimmed value, or a `Validation` error when it is blank.
pub fn require_field(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Parses a currency amount with at most two decimal places. A leading
/// minus is allowed; the kind of the owning row decides its meaning.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("amount is required".to_string()));
    }
    if !AMOUNT_RE.is_match(trimmed) {
        return Err(Error::Validation(format!(
            "'{trimmed}' is not a valid amount (e.g. 50, 12.34, -10.50)"
        )));
    }
    trimmed.parse::<f64>().map_err(|_| {
        Error::Validation(format!("'{trimmed}' is not a valid amount"))
    })
}

/// Like [`parse_amount`] but rejects negative values (budgets, reminders).
pub fn parse_unsigned_amount(raw: &str) -> Result<f64> {
    let amount = parse_amount(raw)?;
    if amount < 0.0 {
        return Err(Error::Validation(format!(
            "amount must not be negative (got {amount})"
        )));
    }
    Ok(amount)
}

/// Like [`parse_amount`] but requires a strictly positive value (goals,
/// goal payments).
pub fn parse_positive_amount(raw: &str) -> Result<f64> {
    let amount = parse_amount(raw)?;
    if amount <= 0.0 {
        return Err(Error::Validation(format!(
            "amount must be positive (got {amount})"
        )));
    }
    Ok(amount)
}

/// Parses a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        Error::Validation(format!(
            "{field} '{trimmed}' is not a valid date (expected YYYY-MM-DD)"
        ))
    })
}

/// Validates a `YYYY-MM` month label by probing its first day.
pub fn parse_month(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("month is required".to_string()));
    }
    NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d").map_err(|_| {
        Error::Validation(format!(
            "'{trimmed}' is not a valid month (expected YYYY-MM)"
        ))
    })?;
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_amounts() {
        assert_eq!(parse_amount("50").unwrap(), 50.0);
        assert_eq!(parse_amount("12.34").unwrap(), 12.34);
        assert_eq!(parse_amount("-10.50").unwrap(), -10.5);
        assert_eq!(parse_amount(".34").unwrap(), 0.34);
        assert_eq!(parse_amount(" 7.5 ").unwrap(), 7.5);
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("12.345").is_err());
        assert!(parse_amount("1,200").is_err());
        assert!(parse_amount("abc").is_err());
        // Pattern-only matches that still fail numeric parsing.
        assert!(parse_amount("-").is_err());
        assert!(parse_amount(".").is_err());
    }

    #[test]
    fn signed_variants_enforce_their_bounds() {
        assert!(parse_unsigned_amount("-1").is_err());
        assert_eq!(parse_unsigned_amount("0").unwrap(), 0.0);
        assert!(parse_positive_amount("0").is_err());
        assert!(parse_positive_amount("-5").is_err());
        assert_eq!(parse_positive_amount("5").unwrap(), 5.0);
    }

    #[test]
    fn date_and_month_parsing() {
        assert!(parse_date("date", "2026-02-28").is_ok());
        assert!(parse_date("date", "2026-02-30").is_err());
        assert!(parse_date("date", "28-02-2026").is_err());

        assert_eq!(parse_month("2026-02").unwrap(), "2026-02");
        assert!(parse_month("2026-13").is_err());
        assert!(parse_month("Feb 2026").is_err());
        assert!(parse_month("").is_err());
    }

    #[test]
    fn required_fields_are_trimmed() {
        assert_eq!(require_field("category", " Food ").unwrap(), "Food");
        assert!(require_field("category", "   ").is_err());
    }
}
