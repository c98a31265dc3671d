//! Storage configuration validators
//!
//! This module provides validation implementations for storage-related configuration
//! structures including StorageConfig, DatabaseConfig, RedisConfig and CacheConfig.

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

impl Validate for StorageConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating storage configuration");

        self.database.validate()?;
        self.redis.validate()?;

        Ok(())
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }

        let supported = ["postgresql://", "postgres://", "sqlite:"];
        if !supported.iter().any(|scheme| self.url.starts_with(scheme)) {
            return Err("Only PostgreSQL and SQLite databases are supported".to_string());
        }

        if self.max_connections == 0 {
            return Err("Database max connections must be greater than 0".to_string());
        }

        if self.max_connections > 1000 {
            return Err("Database max connections should not exceed 1000".to_string());
        }

        if self.connection_timeout == 0 {
            return Err("Database connection timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for RedisConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if self.url.is_empty() {
            return Err("Redis URL cannot be empty".to_string());
        }

        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err("Redis URL must start with redis:// or rediss://".to_string());
        }

        if self.max_connections == 0 {
            return Err("Redis max connections must be greater than 0".to_string());
        }

        if self.connection_timeout == 0 {
            return Err("Redis connection timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.local_capacity == 0 {
            return Err("Local cache capacity must be greater than 0".to_string());
        }

        if self.tenant_ttl == 0 || self.settings_ttl == 0 || self.permission_ttl == 0 {
            return Err("Cache TTLs must be greater than 0".to_string());
        }

        if self.tenant_miss_ttl == 0 {
            return Err("Tenant miss TTL must be greater than 0".to_string());
        }

        if self.network_timeout_ms == 0 {
            return Err("Network cache timeout must be greater than 0".to_string());
        }

        if self.network_timeout_ms > 10_000 {
            return Err("Network cache timeout should not exceed 10s".to_string());
        }

        Ok(())
    }
}
