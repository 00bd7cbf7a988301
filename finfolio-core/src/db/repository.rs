use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Investment, NewInvestment};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for investments.
///
/// A repository is acquired for the duration of one command and released
/// with [`close`](InvestmentRepository::close); nothing holds it globally.
#[async_trait]
pub trait InvestmentRepository: Send + Sync {
    /// Persists a draft and returns the stored record with its new id.
    async fn create_investment(
        &self,
        investment: NewInvestment,
    ) -> Result<Investment, RepositoryError>;

    async fn get_investment(
        &self,
        id: i64,
    ) -> Result<Investment, RepositoryError>;

    /// Writes back the settlement (gross return, tax and derived fields) of
    /// an existing record.
    async fn update_investment(
        &self,
        investment: &Investment,
    ) -> Result<(), RepositoryError>;

    /// All investments, oldest application date first.
    async fn list_investments(&self) -> Result<Vec<Investment>, RepositoryError>;

    /// Releases the underlying connection. The repository must not be used
    /// afterwards.
    async fn close(&self) {}
}
