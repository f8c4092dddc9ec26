//! Free-text number parsing
//!
//! Users type lengths and prices the way they write them by hand, so a single
//! decimal comma is accepted in place of a decimal point.

use thiserror::Error;

/// Rejection reasons for free-text numeric input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidNumber {
    #[error("empty input")]
    Empty,
    #[error("more than one decimal separator in {0:?}")]
    MultipleSeparators(String),
    #[error("not a number: {0:?}")]
    NotNumeric(String),
}

/// Parse a positive magnitude from user text.
///
/// Only ASCII digits and one `.` or `,` separator are accepted. Signs,
/// exponents and `inf`/`nan` spellings are rejected even though `f64::from_str`
/// would take them.
pub fn parse_number(text: &str) -> Result<f64, InvalidNumber> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InvalidNumber::Empty);
    }

    let normalized = trimmed.replace(',', ".");
    if normalized.matches('.').count() > 1 {
        return Err(InvalidNumber::MultipleSeparators(trimmed.to_string()));
    }

    let well_formed = normalized.chars().all(|c| c.is_ascii_digit() || c == '.')
        && normalized.chars().any(|c| c.is_ascii_digit());
    if !well_formed {
        return Err(InvalidNumber::NotNumeric(trimmed.to_string()));
    }

    // Digit strings past f64's range parse to infinity
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InvalidNumber::NotNumeric(trimmed.to_string())),
    }
}
