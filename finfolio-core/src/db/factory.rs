use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use super::repository::{InvestmentRepository, RepositoryError};

/// Which store to open, and how.
///
/// | backend  | connection_string                               |
/// |----------|-------------------------------------------------|
/// | `sqlite` | `finfolio.db`, `sqlite:finfolio.db`, `:memory:` |
/// | `memory` | ignored                                         |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Name of a registered [`RepositoryFactory`].
    pub backend: String,
    /// Handed to the factory as is.
    pub connection_string: String,
}

impl DbConfig {
    pub fn new(
        backend: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self {
            backend: backend.into(),
            connection_string: connection_string.into(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::new("sqlite", "finfolio.db")
    }
}

/// Opens repositories for one storage backend.
///
/// Each backend crate exposes a unit struct implementing this trait; the
/// binary registers them in a [`RepositoryRegistry`] at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name matched against [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    /// Opens the store, creating it and bringing its schema up to date when
    /// needed, so callers get a repository that is ready to use.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn InvestmentRepository>, RepositoryError>;
}

/// Backend factories keyed by [`RepositoryFactory::backend_name`].
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a backend. A factory registered earlier under the same name is
    /// replaced.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names in alphabetical order.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens a repository with the factory named by `config.backend`.
    ///
    /// # Errors
    /// [`RepositoryError::Configuration`] when the backend is unknown,
    /// otherwise whatever the factory reports.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn InvestmentRepository>, RepositoryError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(RepositoryError::Configuration(format!(
                "unknown backend '{}'; available: {:?}",
                config.backend,
                self.available_backends()
            )));
        };

        debug!(backend = factory.backend_name(), "creating repository");
        factory.create(config).await
    }
}
