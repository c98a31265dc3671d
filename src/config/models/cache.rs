//! Cache configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Two-tier cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Capacity of each in-process cache
    #[serde(default = "default_local_cache_capacity")]
    pub local_capacity: u64,
    /// Tenant record TTL in seconds
    #[serde(default = "default_tenant_cache_ttl")]
    pub tenant_ttl: u64,
    /// How long a custom domain with no tenant is remembered, in seconds
    #[serde(default = "default_tenant_miss_ttl")]
    pub tenant_miss_ttl: u64,
    /// Settings document TTL in seconds
    #[serde(default = "default_settings_cache_ttl")]
    pub settings_ttl: u64,
    /// Effective permission set TTL in seconds
    #[serde(default = "default_permission_cache_ttl")]
    pub permission_ttl: u64,
    /// Upper bound for a single network cache call in milliseconds
    #[serde(default = "default_network_timeout_ms")]
    pub network_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            local_capacity: default_local_cache_capacity(),
            tenant_ttl: default_tenant_cache_ttl(),
            tenant_miss_ttl: default_tenant_miss_ttl(),
            settings_ttl: default_settings_cache_ttl(),
            permission_ttl: default_permission_cache_ttl(),
            network_timeout_ms: default_network_timeout_ms(),
        }
    }
}

impl CacheConfig {
    pub fn network_timeout(&self) -> Duration {
        Duration::from_millis(self.network_timeout_ms)
    }
}
