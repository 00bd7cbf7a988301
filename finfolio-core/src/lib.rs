pub mod calculations;
pub mod db;
pub mod form;
pub mod models;
pub mod service;

pub use db::repository::{InvestmentRepository, RepositoryError};
pub use models::*;
pub use service::{PortfolioService, PortfolioSummary, ServiceError};
