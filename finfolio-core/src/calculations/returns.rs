//! Realized return calculations for a fixed-income investment.
//!
//! Given the principal, the holding period and the externally supplied gross
//! return and tax, the calculator derives:
//!
//! | Field             | Formula |
//! |-------------------|---------|
//! | `net_return`      | gross return − tax |
//! | `return_percent`  | net return ÷ principal (only when principal > 0) |
//! | `annualized_rate` | (1 + return percent)^(365 ÷ period days) − 1 (only when period days > 0) |
//!
//! The annualization exponent is generally fractional (365 ÷ 90 ≈ 4.06), so
//! it is evaluated with a real-valued power rather than repeated
//! multiplication.
//!
//! # Example
//!
//! ```
//! use rust_decimal::prelude::ToPrimitive;
//! use rust_decimal_macros::dec;
//! use finfolio_core::calculations::{ReturnsCalculator, ReturnsInput};
//!
//! let input = ReturnsInput {
//!     value: dec!(1000.00),
//!     period_days: 90,
//!     gross_return: dec!(120.00),
//!     tax: dec!(20.00),
//! };
//!
//! let returns = ReturnsCalculator::calculate(&input);
//!
//! assert_eq!(returns.net_return, dec!(100.00));
//! assert_eq!(returns.return_percent, Some(dec!(0.1)));
//! let annualized = returns.annualized_rate.unwrap().to_f64().unwrap();
//! assert!((annualized - 0.4719).abs() < 1e-4);
//! ```

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Length of the year used to annualize a period return.
pub const DAYS_PER_YEAR: i64 = 365;

/// Decimal places kept on the annualized rate. The power is evaluated in
/// `f64`, so digits beyond this are noise.
const ANNUALIZED_RATE_DP: u32 = 10;

/// Input values for a returns calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnsInput {
    /// Principal invested.
    pub value: Decimal,

    /// Whole days between application and redemption.
    pub period_days: i64,

    /// Total yield before tax, as reported by the bank.
    pub gross_return: Decimal,

    /// Tax withheld on the gross return.
    pub tax: Decimal,
}

/// Gross return and tax together with every field derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Returns {
    pub gross_return: Decimal,
    pub tax: Decimal,

    /// Gross return minus tax.
    pub net_return: Decimal,

    /// Net return as a fraction of the principal. `None` when the principal
    /// is not positive.
    pub return_percent: Option<Decimal>,

    /// Return percent compounded to a 365-day year. `None` for a zero-day
    /// period or when the rate cannot be represented.
    pub annualized_rate: Option<Decimal>,
}

/// Stateless calculator for [`Returns`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnsCalculator;

impl ReturnsCalculator {
    /// Computes all derived fields from `input`.
    ///
    /// Pure and deterministic: the same input always yields the same output.
    pub fn calculate(input: &ReturnsInput) -> Returns {
        let net_return = Self::net_return(input.gross_return, input.tax);
        let return_percent = Self::return_percent(net_return, input.value);
        let annualized_rate = return_percent
            .and_then(|percent| Self::annualized_rate(percent, input.period_days));

        debug!(
            %net_return,
            ?return_percent,
            ?annualized_rate,
            period_days = input.period_days,
            "calculated returns"
        );

        Returns {
            gross_return: input.gross_return,
            tax: input.tax,
            net_return,
            return_percent,
            annualized_rate,
        }
    }

    /// Calculates net return.
    fn net_return(
        gross_return: Decimal,
        tax: Decimal,
    ) -> Decimal {
        gross_return - tax
    }

    /// Calculates the period return as a fraction of the principal.
    fn return_percent(
        net_return: Decimal,
        value: Decimal,
    ) -> Option<Decimal> {
        if value > Decimal::ZERO {
            net_return.checked_div(value)
        } else {
            None
        }
    }

    /// Annualizes a period return: `(1 + percent)^(365 / days) - 1`.
    fn annualized_rate(
        return_percent: Decimal,
        period_days: i64,
    ) -> Option<Decimal> {
        if period_days <= 0 {
            return None;
        }

        let base = (Decimal::ONE + return_percent).to_f64()?;
        if base < 0.0 {
            warn!(%return_percent, "loss exceeds principal, rate not annualizable");
            return None;
        }

        let exponent = DAYS_PER_YEAR as f64 / period_days as f64;
        let rate = base.powf(exponent) - 1.0;

        match Decimal::try_from(rate) {
            Ok(rate) => Some(rate.round_dp(ANNUALIZED_RATE_DP)),
            Err(e) => {
                warn!(rate, period_days, "annualized rate out of range: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn sample_input() -> ReturnsInput {
        ReturnsInput {
            value: dec!(1000),
            period_days: 90,
            gross_return: dec!(120),
            tax: dec!(20),
        }
    }

    fn annualized_f64(returns: &Returns) -> f64 {
        returns
            .annualized_rate
            .and_then(|r| r.to_f64())
            .expect("annualized rate should be set")
    }

    #[test]
    fn net_return_is_gross_minus_tax() {
        let returns = ReturnsCalculator::calculate(&sample_input());

        assert_eq!(returns.net_return, dec!(100));
    }

    #[test]
    fn return_percent_is_net_over_value() {
        let returns = ReturnsCalculator::calculate(&sample_input());

        assert_eq!(returns.return_percent, Some(dec!(0.1)));
    }

    #[test]
    fn annualized_rate_uses_fractional_exponent() {
        let returns = ReturnsCalculator::calculate(&sample_input());
        let rate = annualized_f64(&returns);

        let expected = 1.1_f64.powf(365.0 / 90.0) - 1.0;
        assert!((rate - expected).abs() < 1e-9, "got {rate}, expected {expected}");
        assert!((rate - 0.4719).abs() < 1e-4);
    }

    #[test]
    fn annualized_rate_is_not_integer_power_approximation() {
        let returns = ReturnsCalculator::calculate(&sample_input());
        let rate = annualized_f64(&returns);

        // 1.1^4 - 1, what truncating the exponent to 4 would produce
        assert!((rate - 0.4641).abs() > 1e-3);
    }

    #[test]
    fn calculate_twice_gives_identical_results() {
        let input = sample_input();

        let first = ReturnsCalculator::calculate(&input);
        let second = ReturnsCalculator::calculate(&input);

        assert_eq!(first, second);
    }

    #[test]
    fn zero_period_leaves_annualized_rate_unset() {
        let input = ReturnsInput {
            period_days: 0,
            ..sample_input()
        };

        let returns = ReturnsCalculator::calculate(&input);

        assert_eq!(returns.net_return, dec!(100));
        assert_eq!(returns.return_percent, Some(dec!(0.1)));
        assert_eq!(returns.annualized_rate, None);
    }

    #[test]
    fn zero_value_leaves_percent_and_rate_unset() {
        let input = ReturnsInput {
            value: Decimal::ZERO,
            ..sample_input()
        };

        let returns = ReturnsCalculator::calculate(&input);

        assert_eq!(returns.net_return, dec!(100));
        assert_eq!(returns.return_percent, None);
        assert_eq!(returns.annualized_rate, None);
    }

    #[test]
    fn full_year_annualized_rate_equals_period_return() {
        let input = ReturnsInput {
            period_days: 365,
            ..sample_input()
        };

        let returns = ReturnsCalculator::calculate(&input);

        assert!((annualized_f64(&returns) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn period_longer_than_a_year_shrinks_the_rate() {
        let input = ReturnsInput {
            period_days: 730,
            gross_return: dec!(210),
            tax: dec!(0),
            ..sample_input()
        };

        let returns = ReturnsCalculator::calculate(&input);

        // 1.21^(1/2) - 1
        assert!((annualized_f64(&returns) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn loss_within_principal_annualizes_to_negative_rate() {
        let input = ReturnsInput {
            gross_return: dec!(0),
            tax: dec!(50),
            ..sample_input()
        };

        let returns = ReturnsCalculator::calculate(&input);

        assert_eq!(returns.net_return, dec!(-50));
        assert!(annualized_f64(&returns) < 0.0);
    }

    #[test]
    fn loss_beyond_principal_is_not_annualized() {
        let input = ReturnsInput {
            gross_return: dec!(0),
            tax: dec!(1500),
            ..sample_input()
        };

        let returns = ReturnsCalculator::calculate(&input);

        assert_eq!(returns.return_percent, Some(dec!(-1.5)));
        assert_eq!(returns.annualized_rate, None);
    }

    #[test]
    fn unrepresentable_rate_is_left_unset() {
        // 2^365 does not fit in a Decimal
        let input = ReturnsInput {
            period_days: 1,
            gross_return: dec!(1000),
            tax: dec!(0),
            ..sample_input()
        };

        let returns = ReturnsCalculator::calculate(&input);

        assert_eq!(returns.return_percent, Some(dec!(1)));
        assert_eq!(returns.annualized_rate, None);
    }
}
