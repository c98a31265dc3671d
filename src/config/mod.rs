//! Configuration management for the access core
//!
//! This module handles loading, validation, and management of all configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub tenancy: TenancyConfig,
    #[serde(default)]
    pub rbac: RbacConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CoreError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| CoreError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Defaults overlaid with environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay environment variables onto this configuration
    pub fn apply_env(&mut self) -> Result<()> {
        debug!("Applying environment overrides");

        if let Ok(url) = env::var("DATABASE_URL") {
            self.storage.database.url = url;
        }
        if let Ok(max_conn) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.storage.database.max_connections = max_conn
                .parse()
                .map_err(|e| CoreError::Config(format!("Invalid max connections: {}", e)))?;
        }
        if let Ok(url) = env::var("REDIS_URL") {
            self.storage.redis.url = url;
            self.storage.redis.enabled = true;
        }
        if let Ok(ttl) = env::var("TENANT_CACHE_TTL") {
            self.cache.tenant_ttl = ttl
                .parse()
                .map_err(|e| CoreError::Config(format!("Invalid tenant cache TTL: {}", e)))?;
        }
        if let Ok(ttl) = env::var("SETTINGS_CACHE_TTL") {
            self.cache.settings_ttl = ttl
                .parse()
                .map_err(|e| CoreError::Config(format!("Invalid settings cache TTL: {}", e)))?;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.storage
            .validate()
            .map_err(|e| CoreError::Config(format!("Storage config error: {}", e)))?;
        self.cache
            .validate()
            .map_err(|e| CoreError::Config(format!("Cache config error: {}", e)))?;
        self.tenancy
            .validate()
            .map_err(|e| CoreError::Config(format!("Tenancy config error: {}", e)))?;
        self.rbac
            .validate()
            .map_err(|e| CoreError::Config(format!("RBAC config error: {}", e)))?;
        self.context
            .validate()
            .map_err(|e| CoreError::Config(format!("Context config error: {}", e)))?;

        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| CoreError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
