//! Portfolio operations that combine the model with a repository.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::db::repository::{InvestmentRepository, RepositoryError};
use crate::models::{Investment, NewInvestment};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{field} cannot be negative, got {amount}")]
    NegativeAmount { field: &'static str, amount: Decimal },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Totals across every stored investment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub investments: usize,
    pub settled: usize,
    /// Sum of principals.
    pub total_invested: Decimal,
    /// Sum of net returns of settled investments.
    pub total_net_return: Decimal,
}

/// Records and settles investments against a caller-supplied repository.
pub struct PortfolioService<'a> {
    repo: &'a dyn InvestmentRepository,
}

impl<'a> PortfolioService<'a> {
    pub fn new(repo: &'a dyn InvestmentRepository) -> Self {
        Self { repo }
    }

    /// Persists a validated draft.
    pub async fn record(
        &self,
        draft: NewInvestment,
    ) -> Result<Investment, ServiceError> {
        let investment = self.repo.create_investment(draft).await?;
        info!(id = investment.id, bank = %investment.bank, value = %investment.value, "investment recorded");
        Ok(investment)
    }

    /// Supplies the realized gross return and tax of investment `id`,
    /// recomputes its derived fields and stores them.
    pub async fn settle(
        &self,
        id: i64,
        gross_return: Decimal,
        tax: Decimal,
    ) -> Result<Investment, ServiceError> {
        check_non_negative("gross return", gross_return)?;
        check_non_negative("tax", tax)?;

        let mut investment = self.repo.get_investment(id).await?;
        investment.settle(gross_return, tax);
        self.repo.update_investment(&investment).await?;

        info!(id, %gross_return, %tax, "investment settled");
        Ok(investment)
    }

    pub async fn get(
        &self,
        id: i64,
    ) -> Result<Investment, ServiceError> {
        Ok(self.repo.get_investment(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Investment>, ServiceError> {
        Ok(self.repo.list_investments().await?)
    }

    pub async fn summary(&self) -> Result<PortfolioSummary, ServiceError> {
        let investments = self.repo.list_investments().await?;
        Ok(summarize(&investments))
    }
}

fn summarize(investments: &[Investment]) -> PortfolioSummary {
    investments
        .iter()
        .fold(PortfolioSummary::default(), |mut summary, inv| {
            summary.investments += 1;
            summary.total_invested += inv.value;
            if let Some(returns) = &inv.returns {
                summary.settled += 1;
                summary.total_net_return += returns.net_return;
            }
            summary
        })
}

fn check_non_negative(
    field: &'static str,
    amount: Decimal,
) -> Result<(), ServiceError> {
    if amount < Decimal::ZERO {
        return Err(ServiceError::NegativeAmount { field, amount });
    }
    Ok(())
}
