//! Redis connection pool and core connection management
//!
//! This module provides Redis connectivity and health checks.

use crate::config::RedisConfig;
use crate::utils::error::{CoreError, Result};
use crate::utils::logging::redact_url;
use redis::{Client, aio::MultiplexedConnection};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Redis connection pool (supports no-op mode when Redis is unavailable)
#[derive(Debug, Clone)]
pub struct RedisPool {
    /// Redis client (None in no-op mode)
    pub(crate) client: Option<Client>,
    /// Multiplexed connection (None in no-op mode)
    pub(crate) connection_manager: Option<MultiplexedConnection>,
    /// Configuration
    pub(crate) config: RedisConfig,
    /// Whether this is a no-op pool (Redis unavailable)
    pub(crate) noop_mode: bool,
}

/// Redis connection wrapper
pub struct RedisConnection {
    pub(crate) conn: Option<MultiplexedConnection>,
}

impl RedisPool {
    /// Create a new Redis pool
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        info!("Creating Redis connection pool");
        debug!("Redis URL: {}", Self::sanitize_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(CoreError::Redis)?;

        let connect = client.get_multiplexed_async_connection();
        let connection_manager =
            tokio::time::timeout(Duration::from_secs(config.connection_timeout), connect)
                .await
                .map_err(|_| CoreError::Timeout("Redis connection timed out".to_string()))?
                .map_err(CoreError::Redis)?;

        info!("Redis connection pool created successfully");
        Ok(Self {
            client: Some(client),
            connection_manager: Some(connection_manager),
            config: config.clone(),
            noop_mode: false,
        })
    }

    /// Connect when enabled, otherwise (or on failure) fall back to no-op mode
    pub async fn connect_or_noop(config: &RedisConfig) -> Self {
        if !config.enabled {
            debug!("Redis disabled, using local cache tier only");
            return Self::create_noop();
        }

        match Self::new(config).await {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Redis connection failed, continuing without Redis: {}", e);
                Self::create_noop()
            }
        }
    }

    /// Create a no-op Redis pool (for when Redis is unavailable)
    pub fn create_noop() -> Self {
        info!("Creating no-op Redis pool (Redis unavailable)");
        Self {
            client: None,
            connection_manager: None,
            config: RedisConfig {
                enabled: false,
                ..RedisConfig::default()
            },
            noop_mode: true,
        }
    }

    /// Check if this is a no-op pool
    pub fn is_noop(&self) -> bool {
        self.noop_mode
    }

    /// Get a connection from the pool
    pub async fn get_connection(&self) -> Result<RedisConnection> {
        Ok(RedisConnection {
            conn: self.connection_manager.clone(),
        })
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        if self.noop_mode {
            debug!("Redis health check skipped (no-op mode)");
            return Ok(());
        }

        debug!("Performing Redis health check");
        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let _: String = redis::cmd("PING")
                .query_async(c)
                .await
                .map_err(CoreError::Redis)?;
        }

        debug!("Redis health check passed");
        Ok(())
    }

    /// Apply the configured key prefix
    pub(crate) fn prefixed(&self, key: &str) -> String {
        if self.config.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.config.key_prefix, key)
        }
    }

    /// Sanitize Redis URL for logging (hide password)
    pub(crate) fn sanitize_url(url: &str) -> String {
        match url::Url::parse(url) {
            Ok(_) => redact_url(url),
            Err(_) => "invalid_url".to_string(),
        }
    }
}
