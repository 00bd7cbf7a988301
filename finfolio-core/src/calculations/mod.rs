//! Return calculations for fixed-income investments.
//!
//! This module derives net return, period return and annualized rate from
//! the principal, holding period, gross return and tax of an investment.

pub mod common;
pub mod returns;

pub use returns::{DAYS_PER_YEAR, Returns, ReturnsCalculator, ReturnsInput};
