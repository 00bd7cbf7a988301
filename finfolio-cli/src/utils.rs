use chrono::NaiveDate;
use finfolio_core::DATE_FORMAT;
use finfolio_core::calculations::common::{round_money, to_percentage};
use rust_decimal::Decimal;
use thiserror::Error;

/// Shown in place of a value that does not exist yet.
pub const MISSING: &str = "—";

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
pub enum ParseDecimalError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid decimal '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a command-line amount into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`). Amounts are
/// required, so empty or whitespace-only input is an error.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Err(ParseDecimalError::Empty);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError::Invalid {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Formats an amount with exactly two decimal places.
pub fn money(d: Decimal) -> String {
    format!("{:.2}", round_money(d))
}

/// Formats an optional amount, using "—" when `None`.
pub fn opt_money(d: Option<Decimal>) -> String {
    d.map(money).unwrap_or_else(|| MISSING.to_string())
}

/// Formats an optional fractional rate as a percentage (`0.1` → `"10.00%"`).
pub fn opt_percent(rate: Option<Decimal>) -> String {
    rate.map(|r| format!("{:.2}%", to_percentage(r)))
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}
