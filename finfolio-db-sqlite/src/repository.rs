use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use finfolio_core::calculations::Returns;
use finfolio_core::{Investment, InvestmentRepository, NewInvestment, RepositoryError};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::decimal::{decimal_to_text, get_decimal, get_optional_decimal};

const MEMORY: &str = ":memory:";

const SELECT_COLUMNS: &str = "SELECT id, application_date, value, redemption_date, bank, title,
        period_days, gross_return, tax, net_return, return_percent, annualized_rate,
        created_at, updated_at
 FROM investments";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open the database at `database_url`.
    ///
    /// Accepts a bare file path (created if missing), `":memory:"`, or a
    /// sqlx-style `sqlite:` URL. An in-memory database lives inside a single
    /// connection, so the pool is pinned to one connection that never expires.
    pub async fn new(database_url: &str) -> Result<Self> {
        let in_memory = database_url == MEMORY || database_url.contains(MEMORY);

        let options = if database_url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(database_url)
                .with_context(|| format!("Invalid database URL: {}", database_url))?
        } else if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .context("Invalid in-memory database URL")?
        } else {
            SqliteConnectOptions::new().filename(database_url)
        };
        let options = options.create_if_missing(true);

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;

        debug!(database_url, in_memory, "sqlite pool opened");
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_investment(row: &sqlx::sqlite::SqliteRow) -> Result<Investment, RepositoryError> {
    let returns = match get_optional_decimal(row, "gross_return")? {
        Some(gross_return) => Some(Returns {
            gross_return,
            tax: get_decimal(row, "tax")?,
            net_return: get_decimal(row, "net_return")?,
            return_percent: get_optional_decimal(row, "return_percent")?,
            annualized_rate: get_optional_decimal(row, "annualized_rate")?,
        }),
        None => None,
    };

    Ok(Investment {
        id: row
            .try_get("id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        application_date: row
            .try_get::<NaiveDate, _>("application_date")
            .map_err(|e| {
                RepositoryError::Database(format!("Failed to get application_date: {}", e))
            })?,
        value: get_decimal(row, "value")?,
        redemption_date: row
            .try_get::<NaiveDate, _>("redemption_date")
            .map_err(|e| {
                RepositoryError::Database(format!("Failed to get redemption_date: {}", e))
            })?,
        bank: row
            .try_get("bank")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        title: row
            .try_get("title")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        period_days: row
            .try_get("period_days")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        returns,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

#[async_trait]
impl InvestmentRepository for SqliteRepository {
    async fn create_investment(
        &self,
        investment: NewInvestment,
    ) -> Result<Investment, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO investments (
                application_date, value, redemption_date, bank, title, period_days,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(investment.application_date)
        .bind(decimal_to_text(investment.value))
        .bind(investment.redemption_date)
        .bind(investment.bank)
        .bind(investment.title)
        .bind(investment.period_days)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_investment(id).await
    }

    async fn get_investment(
        &self,
        id: i64,
    ) -> Result<Investment, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_investment(&row)
    }

    async fn update_investment(
        &self,
        investment: &Investment,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let returns = investment.returns.as_ref();

        let result = sqlx::query(
            "UPDATE investments SET
                gross_return = ?, tax = ?, net_return = ?, return_percent = ?,
                annualized_rate = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(returns.map(|r| decimal_to_text(r.gross_return)))
        .bind(returns.map(|r| decimal_to_text(r.tax)))
        .bind(returns.map(|r| decimal_to_text(r.net_return)))
        .bind(returns.and_then(|r| r.return_percent).map(decimal_to_text))
        .bind(returns.and_then(|r| r.annualized_rate).map(decimal_to_text))
        .bind(now)
        .bind(investment.id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_investments(&self) -> Result<Vec<Investment>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY application_date, id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_investment).collect()
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("sqlite pool closed");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let repo = SqliteRepository::new(MEMORY)
            .await
            .expect("Failed to create in-memory database");
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn create_test_investment() -> NewInvestment {
        NewInvestment {
            application_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            value: dec!(1000.00),
            redemption_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            bank: "Nubank".to_string(),
            title: "CDB 120% CDI".to_string(),
            period_days: 90,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_investment() {
        let repo = setup_test_db().await;

        let created = repo
            .create_investment(create_test_investment())
            .await
            .expect("Should create investment");

        assert!(created.id > 0);
        assert_eq!(created.value, dec!(1000.00));
        assert_eq!(created.period_days, 90);
        assert_eq!(created.bank, "Nubank");
        assert_eq!(created.title, "CDB 120% CDI");
        assert_eq!(created.returns, None);

        let fetched = repo
            .get_investment(created.id)
            .await
            .expect("Should fetch investment");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_value_keeps_scale() {
        let repo = setup_test_db().await;
        let mut draft = create_test_investment();
        draft.value = dec!(0.10);

        let created = repo.create_investment(draft).await.expect("Should create");

        assert_eq!(created.value.to_string(), "0.10");
    }

    #[tokio::test]
    async fn test_get_investment_not_found() {
        let repo = setup_test_db().await;

        let result = repo.get_investment(99999).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_update_investment_persists_settlement() {
        let repo = setup_test_db().await;
        let mut created = repo
            .create_investment(create_test_investment())
            .await
            .expect("Should create investment");

        created.settle(dec!(120.00), dec!(20.00));
        repo.update_investment(&created)
            .await
            .expect("Should update investment");

        let fetched = repo
            .get_investment(created.id)
            .await
            .expect("Should fetch investment");
        assert_eq!(fetched.returns, created.returns);
        let returns = fetched.returns.expect("settled");
        assert_eq!(returns.net_return, dec!(100.00));
        assert_eq!(returns.return_percent, Some(dec!(0.1)));
    }

    #[tokio::test]
    async fn test_update_zero_period_stores_null_rate() {
        let repo = setup_test_db().await;
        let mut draft = create_test_investment();
        draft.redemption_date = draft.application_date;
        draft.period_days = 0;
        let mut created = repo.create_investment(draft).await.expect("Should create");

        created.settle(dec!(5), dec!(1));
        repo.update_investment(&created).await.expect("Should update");

        let returns = repo
            .get_investment(created.id)
            .await
            .expect("Should fetch")
            .returns
            .expect("settled");
        assert_eq!(returns.net_return, dec!(4));
        assert_eq!(returns.annualized_rate, None);
    }

    #[tokio::test]
    async fn test_update_investment_not_found() {
        let repo = setup_test_db().await;
        let mut created = repo
            .create_investment(create_test_investment())
            .await
            .expect("Should create investment");

        created.id = 99999;
        created.settle(dec!(1), dec!(0));

        assert_eq!(repo.update_investment(&created).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_investments_ordered_by_application_date() {
        let repo = setup_test_db().await;
        let mut later = create_test_investment();
        later.application_date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        later.bank = "Inter".to_string();
        repo.create_investment(later).await.expect("Should create");
        repo.create_investment(create_test_investment())
            .await
            .expect("Should create");

        let banks: Vec<String> = repo
            .list_investments()
            .await
            .expect("Should list")
            .into_iter()
            .map(|i| i.bank)
            .collect();

        assert_eq!(banks, vec!["Nubank".to_string(), "Inter".to_string()]);
    }

    #[tokio::test]
    async fn test_list_investments_empty() {
        let repo = setup_test_db().await;

        assert_eq!(repo.list_investments().await, Ok(vec![]));
    }

    #[tokio::test]
    async fn test_schema_rejects_redemption_before_application() {
        let repo = setup_test_db().await;
        let mut draft = create_test_investment();
        draft.redemption_date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

        let result = repo.create_investment(draft).await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }

    #[tokio::test]
    async fn test_close_releases_pool() {
        let repo = setup_test_db().await;

        repo.close().await;

        assert!(repo.pool().is_closed());
    }
}
