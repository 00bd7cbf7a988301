use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::{Returns, ReturnsCalculator, ReturnsInput};

/// Date format used for every date the user types or reads back.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Where an investment sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentStatus {
    /// Persisted, waiting for gross return and tax.
    Recorded,
    /// Gross return and tax supplied, derived fields computed.
    Settled,
}

impl InvestmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recorded => "recorded",
            Self::Settled => "settled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investment {
    pub id: i64,

    // User-provided values, fixed at creation
    pub application_date: NaiveDate,
    pub value: Decimal,
    pub redemption_date: NaiveDate,
    pub bank: String,
    pub title: String,

    /// Whole days between application and redemption.
    pub period_days: i64,

    /// Present once the investment has been settled.
    pub returns: Option<Returns>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Investment {
    pub fn status(&self) -> InvestmentStatus {
        if self.returns.is_some() {
            InvestmentStatus::Settled
        } else {
            InvestmentStatus::Recorded
        }
    }

    /// Supplies the realized gross return and tax and recomputes every
    /// derived field in one step.
    pub fn settle(
        &mut self,
        gross_return: Decimal,
        tax: Decimal,
    ) {
        let input = ReturnsInput {
            value: self.value,
            period_days: self.period_days,
            gross_return,
            tax,
        };
        self.returns = Some(ReturnsCalculator::calculate(&input));
    }
}

/// A parsed, validated investment that has not been persisted yet
/// (no id, no returns).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvestment {
    pub application_date: NaiveDate,
    pub value: Decimal,
    pub redemption_date: NaiveDate,
    pub bank: String,
    pub title: String,
    pub period_days: i64,
}
