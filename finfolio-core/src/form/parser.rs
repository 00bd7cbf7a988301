//! Conversion of raw form text into a validated [`NewInvestment`].

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use super::state::{APPLICATION_DATE, BANK, FieldValues, REDEMPTION_DATE, TITLE, VALUE};
use crate::models::{DATE_FORMAT, NewInvestment};

/// Reasons a submitted form is rejected. Only the first problem found is
/// reported.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid {0} format (use YYYY/MM/DD)")]
    InvalidDateFormat(String),

    #[error("invalid {0} format (use a number such as 1000.00)")]
    InvalidNumberFormat(String),

    #[error("redemption date cannot be before application date")]
    InvalidDateRange,

    #[error("value must be greater than zero")]
    NonPositiveValue,
}

impl ValidationError {
    /// Label of the field the user has to correct.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidDateFormat(field) | Self::InvalidNumberFormat(field) => field.as_str(),
            Self::InvalidDateRange => REDEMPTION_DATE,
            Self::NonPositiveValue => VALUE,
        }
    }
}

/// Parses and validates the raw values of a submitted form.
///
/// Checks run in field order and stop at the first failure:
/// application date, value (must be positive), redemption date, then the
/// date range. Bank and title are free text and may be empty. A label
/// missing from `values` is treated as an empty field.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn parse_form_data(values: &FieldValues) -> Result<NewInvestment, ValidationError> {
    let application_date = parse_date(values, APPLICATION_DATE)?;
    let value = parse_value(values)?;
    let redemption_date = parse_date(values, REDEMPTION_DATE)?;

    if redemption_date < application_date {
        return Err(ValidationError::InvalidDateRange);
    }

    let period_days = (redemption_date - application_date).num_days();
    debug!(%application_date, %redemption_date, period_days, %value, "parsed investment form");

    Ok(NewInvestment {
        application_date,
        value,
        redemption_date,
        bank: raw(values, BANK).to_string(),
        title: raw(values, TITLE).to_string(),
        period_days,
    })
}

fn raw<'a>(
    values: &'a FieldValues,
    label: &str,
) -> &'a str {
    values.get(label).map(String::as_str).unwrap_or("")
}

/// `YYYY/MM/DD` exactly: four-digit year, zero-padded month and day.
///
/// chrono alone would take `25/01/01` or `2025/1/1`.
fn has_date_shape(text: &str) -> bool {
    text.len() == 10
        && text.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'/',
            _ => b.is_ascii_digit(),
        })
}

fn parse_date(
    values: &FieldValues,
    label: &str,
) -> Result<NaiveDate, ValidationError> {
    let text = raw(values, label).trim();
    let invalid = || ValidationError::InvalidDateFormat(label.to_string());

    if !has_date_shape(text) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| invalid())
}

fn parse_value(values: &FieldValues) -> Result<Decimal, ValidationError> {
    let value = Decimal::from_str(raw(values, VALUE).trim())
        .map_err(|_| ValidationError::InvalidNumberFormat(VALUE.to_string()))?;

    if value <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveValue);
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn valid_values() -> FieldValues {
        [
            (APPLICATION_DATE, "2025/01/01"),
            (VALUE, "1000.00"),
            (BANK, "Nubank"),
            (TITLE, "CDB 120% CDI"),
            (REDEMPTION_DATE, "2025/04/01"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn with(
        label: &str,
        value: &str,
    ) -> FieldValues {
        let mut values = valid_values();
        values.insert(label.to_string(), value.to_string());
        values
    }

    #[test]
    fn parses_complete_form() {
        let draft = parse_form_data(&valid_values()).expect("valid form");

        assert_eq!(
            draft,
            NewInvestment {
                application_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                value: dec!(1000.00),
                redemption_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                bank: "Nubank".to_string(),
                title: "CDB 120% CDI".to_string(),
                period_days: 90,
            }
        );
    }

    #[test]
    fn rejects_iso_dash_date() {
        let result = parse_form_data(&with(APPLICATION_DATE, "2025-13-40"));

        assert_eq!(
            result,
            Err(ValidationError::InvalidDateFormat(APPLICATION_DATE.to_string()))
        );
    }

    #[test]
    fn rejects_impossible_calendar_date() {
        let result = parse_form_data(&with(REDEMPTION_DATE, "2025/02/30"));

        assert_eq!(
            result,
            Err(ValidationError::InvalidDateFormat(REDEMPTION_DATE.to_string()))
        );
    }

    #[test]
    fn rejects_dates_without_padded_fields() {
        for text in ["25/01/01", "2025/1/1", "+2025/01/01", "02025/01/01", "2025/01/1 "] {
            assert_eq!(
                parse_form_data(&with(APPLICATION_DATE, text)),
                Err(ValidationError::InvalidDateFormat(APPLICATION_DATE.to_string())),
                "{text:?}"
            );
        }
    }

    #[test]
    fn short_redemption_date_is_a_format_error() {
        let result = parse_form_data(&with(REDEMPTION_DATE, "2025/4/1"));

        assert_eq!(
            result,
            Err(ValidationError::InvalidDateFormat(REDEMPTION_DATE.to_string()))
        );
    }

    #[test]
    fn date_shape() {
        assert!(has_date_shape("2025/01/01"));
        assert!(!has_date_shape("2025-01-01"));
        assert!(!has_date_shape("2025/01/0a"));
        assert!(!has_date_shape("２０２５/01/01"));
    }

    #[test]
    fn rejects_non_numeric_value() {
        let result = parse_form_data(&with(VALUE, "mil reais"));

        assert_eq!(result, Err(ValidationError::InvalidNumberFormat(VALUE.to_string())));
    }

    #[test]
    fn rejects_zero_value() {
        let result = parse_form_data(&with(VALUE, "0"));

        assert_eq!(result, Err(ValidationError::NonPositiveValue));
    }

    #[test]
    fn rejects_negative_value() {
        let result = parse_form_data(&with(VALUE, "-10.50"));

        assert_eq!(result, Err(ValidationError::NonPositiveValue));
    }

    #[test]
    fn trims_whitespace_around_value_and_dates() {
        let mut values = with(VALUE, "  250.75 ");
        values.insert(APPLICATION_DATE.to_string(), " 2025/01/01".to_string());

        let draft = parse_form_data(&values).expect("valid form");

        assert_eq!(draft.value, dec!(250.75));
    }

    #[test]
    fn rejects_redemption_before_application() {
        let mut values = with(APPLICATION_DATE, "2025/06/01");
        values.insert(REDEMPTION_DATE.to_string(), "2025/05/01".to_string());

        let result = parse_form_data(&values);

        assert_eq!(result, Err(ValidationError::InvalidDateRange));
    }

    #[test]
    fn same_day_redemption_gives_zero_period() {
        let draft = parse_form_data(&with(REDEMPTION_DATE, "2025/01/01")).expect("valid form");

        assert_eq!(draft.period_days, 0);
    }

    #[test]
    fn first_error_wins() {
        let mut values = with(APPLICATION_DATE, "garbage");
        values.insert(VALUE.to_string(), "also garbage".to_string());

        let result = parse_form_data(&values);

        assert_eq!(
            result,
            Err(ValidationError::InvalidDateFormat(APPLICATION_DATE.to_string()))
        );
    }

    #[test]
    fn value_is_checked_before_redemption_date() {
        let mut values = with(VALUE, "-1");
        values.insert(REDEMPTION_DATE.to_string(), "nope".to_string());

        assert_eq!(parse_form_data(&values), Err(ValidationError::NonPositiveValue));
    }

    #[test]
    fn bank_and_title_may_be_empty() {
        let mut values = with(BANK, "");
        values.remove(TITLE);

        let draft = parse_form_data(&values).expect("valid form");

        assert_eq!(draft.bank, "");
        assert_eq!(draft.title, "");
    }

    #[test]
    fn missing_application_date_is_a_format_error() {
        let mut values = valid_values();
        values.remove(APPLICATION_DATE);

        assert_eq!(
            parse_form_data(&values),
            Err(ValidationError::InvalidDateFormat(APPLICATION_DATE.to_string()))
        );
    }

    #[test]
    fn period_spans_leap_day() {
        let mut values = with(APPLICATION_DATE, "2024/02/01");
        values.insert(REDEMPTION_DATE.to_string(), "2024/03/01".to_string());

        let draft = parse_form_data(&values).expect("valid form");

        assert_eq!(draft.period_days, 29);
    }

    #[test]
    fn error_names_field_to_correct() {
        assert_eq!(
            ValidationError::InvalidDateFormat(APPLICATION_DATE.to_string()).field(),
            APPLICATION_DATE
        );
        assert_eq!(ValidationError::InvalidNumberFormat(VALUE.to_string()).field(), VALUE);
        assert_eq!(ValidationError::InvalidDateRange.field(), REDEMPTION_DATE);
        assert_eq!(ValidationError::NonPositiveValue.field(), VALUE);
    }

    #[test]
    fn error_messages_are_user_facing() {
        assert_eq!(
            ValidationError::InvalidDateFormat(REDEMPTION_DATE.to_string()).to_string(),
            "invalid Redemption Date format (use YYYY/MM/DD)"
        );
        assert_eq!(
            ValidationError::InvalidDateRange.to_string(),
            "redemption date cannot be before application date"
        );
    }
}
