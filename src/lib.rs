pub mod billing;
pub mod configuration;
pub mod core;
pub mod database;

use billing::{ProviderConfigResolver, TariffSnapshot};
use configuration::{Config, TariffSource};
use database::{DatabaseService, EnhancedTariffStore, StandardTariffStore};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config Error:{0}")]
    ConfigError(String),

    #[error("Database Error:{0}")]
    DatabaseError(String),

    #[error("Service error:{0}")]
    ServiceError(String),
}

/// Picks the tariff store named in the configuration.
pub fn tariff_resolver(config: &Config) -> Result<Arc<dyn ProviderConfigResolver>, AppError> {
    let resolver: Arc<dyn ProviderConfigResolver> = match config.tariff_source {
        TariffSource::Standard => {
            let database = DatabaseService::new().map_err(|e| AppError::DatabaseError(e.to_string()))?;
            Arc::new(StandardTariffStore::new(Arc::new(database)))
        }
        TariffSource::Enhanced => {
            let database = DatabaseService::new().map_err(|e| AppError::DatabaseError(e.to_string()))?;
            Arc::new(EnhancedTariffStore::new(Arc::new(database)))
        }
        TariffSource::Snapshot => {
            let path = config
                .snapshot_path
                .as_deref()
                .ok_or_else(|| AppError::ConfigError("snapshot_path not set".to_string()))?;
            let snapshot = TariffSnapshot::new(path).map_err(|e| AppError::ConfigError(e.to_string()))?;
            Arc::new(snapshot)
        }
    };
    Ok(resolver)
}
