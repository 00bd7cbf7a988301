use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::factory::{DbConfig, RepositoryFactory};
use super::repository::{InvestmentRepository, RepositoryError};
use crate::models::{Investment, NewInvestment};

/// Volatile repository backed by a `Vec`. Ids start at 1 and are never
/// reused. Handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    records: Mutex<Vec<Investment>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, Vec<Investment>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|e| RepositoryError::Database(format!("memory store poisoned: {e}")))
    }
}

#[async_trait]
impl InvestmentRepository for MemoryRepository {
    async fn create_investment(
        &self,
        investment: NewInvestment,
    ) -> Result<Investment, RepositoryError> {
        let mut records = self.records()?;
        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let now = Utc::now();
        let stored = Investment {
            id,
            application_date: investment.application_date,
            value: investment.value,
            redemption_date: investment.redemption_date,
            bank: investment.bank,
            title: investment.title,
            period_days: investment.period_days,
            returns: None,
            created_at: now,
            updated_at: now,
        };
        records.push(stored.clone());
        Ok(stored)
    }

    async fn get_investment(
        &self,
        id: i64,
    ) -> Result<Investment, RepositoryError> {
        self.records()?
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn update_investment(
        &self,
        investment: &Investment,
    ) -> Result<(), RepositoryError> {
        let mut records = self.records()?;
        let record = records
            .iter_mut()
            .find(|r| r.id == investment.id)
            .ok_or(RepositoryError::NotFound)?;
        record.returns = investment.returns.clone();
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn list_investments(&self) -> Result<Vec<Investment>, RepositoryError> {
        let mut all = self.records()?.clone();
        all.sort_by_key(|r| (r.application_date, r.id));
        Ok(all)
    }
}

/// [`RepositoryFactory`] for the `"memory"` backend. The connection string
/// is ignored; every `create` returns a fresh, empty store.
pub struct MemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for MemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &DbConfig,
    ) -> Result<Box<dyn InvestmentRepository>, RepositoryError> {
        Ok(Box::new(MemoryRepository::new()))
    }
}
