//! Wiring of stores and services from configuration.

use std::sync::Arc;

use mockable::DefaultClock;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::task::{
    adapters::{
        memory::InMemoryTaskStore,
        postgres::{PostgresTaskStore, connect_pool},
    },
    ports::TaskStore,
    services::TaskService,
};

/// Service type produced by [`build_service`].
pub type ConfiguredTaskService = TaskService<dyn TaskStore, DefaultClock>;

/// Errors raised while wiring the task service.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The database pool could not be created.
    #[error("failed to connect to task database: {0}")]
    Database(#[from] diesel::r2d2::PoolError),
}

/// Builds the configured task store.
///
/// Uses `PostgreSQL` when a database URL is configured and the in-memory
/// store otherwise.
///
/// # Errors
///
/// Returns [`BootstrapError::Database`] when the pool cannot connect.
pub fn build_store(config: &AppConfig) -> Result<Arc<dyn TaskStore>, BootstrapError> {
    match config.database_url.as_deref() {
        Some(url) => {
            let pool = connect_pool(url, config.pool_max_size, config.store_timeout)?;
            info!(pool_max_size = config.pool_max_size, "using PostgreSQL task store");
            Ok(Arc::new(PostgresTaskStore::new(pool)))
        }
        None => {
            info!("using in-memory task store");
            Ok(Arc::new(InMemoryTaskStore::new()))
        }
    }
}

/// Builds a task service over the configured store and the system clock.
///
/// # Errors
///
/// Returns [`BootstrapError::Database`] when the pool cannot connect.
pub fn build_service(config: &AppConfig) -> Result<ConfiguredTaskService, BootstrapError> {
    let store = build_store(config)?;
    Ok(TaskService::new(store, Arc::new(DefaultClock)).with_config(config.service_config()))
}
