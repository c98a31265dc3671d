use crate::config::DatabaseConfig;
use crate::utils::error::{CoreError, Result};
use crate::utils::logging::redact_url;
use sea_orm::*;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::super::entities;
use super::super::migration::Migrator;
use super::context_loader::SeaOrmContextLoader;
use super::settings_store::SeaOrmSettingsStore;
use super::tenant_store::SeaOrmTenantStore;
use super::types::{DatabaseBackendType, SeaOrmDatabase};

impl SeaOrmDatabase {
    /// Connect to the shared database
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let db = Self::try_connect(config).await?;
        let backend_type = DatabaseBackendType::from_url(&config.url);
        info!(
            "Database connection established ({:?}, {})",
            backend_type,
            redact_url(&config.url)
        );
        Ok(Self::from_connection(db, backend_type))
    }

    /// Wrap an existing connection
    pub fn from_connection(db: DatabaseConnection, backend_type: DatabaseBackendType) -> Self {
        Self {
            db: Arc::new(db),
            backend_type,
        }
    }

    async fn try_connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
        // Every connection to `sqlite::memory:` is its own database
        let max_connections = if config.url.contains(":memory:") {
            1
        } else {
            config.max_connections
        };

        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(max_connections)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.connection_timeout))
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(3600))
            .sqlx_logging(config.sql_logging)
            .sqlx_logging_level(log::LevelFilter::Debug);

        Database::connect(opt).await.map_err(CoreError::Database)
    }

    /// Get the current backend type
    pub fn backend_type(&self) -> DatabaseBackendType {
        self.backend_type
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");
        Migrator::up(&*self.db, None).await.map_err(|e| {
            warn!("Migration failed: {}", e);
            CoreError::Database(e)
        })?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// The shared connection, also handed to the connection router
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.db)
    }

    pub fn tenant_store(&self) -> SeaOrmTenantStore {
        SeaOrmTenantStore::new(self.connection())
    }

    pub fn settings_store(&self) -> SeaOrmSettingsStore {
        SeaOrmSettingsStore::new(self.connection())
    }

    pub fn context_loader(&self) -> SeaOrmContextLoader {
        SeaOrmContextLoader::new(self.connection())
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing database health check");

        let _result = entities::Organization::find()
            .limit(1)
            .all(&*self.db)
            .await
            .map_err(CoreError::Database)?;

        debug!("Database health check passed");
        Ok(())
    }
}
