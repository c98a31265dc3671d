//! Configuration data models
//!
//! This module defines all configuration structures used throughout the crate.

pub mod access;
pub mod cache;
pub mod logging;
pub mod storage;
pub mod tenancy;

// Re-export all configuration types
pub use access::*;
pub use cache::*;
pub use logging::*;
pub use storage::*;
pub use tenancy::*;

pub fn default_true() -> bool {
    true
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_connection_timeout() -> u64 {
    5
}

pub fn default_redis_max_connections() -> u32 {
    20
}

pub fn default_local_cache_capacity() -> u64 {
    10_000
}

pub fn default_tenant_cache_ttl() -> u64 {
    300 // 5 minutes
}

pub fn default_tenant_miss_ttl() -> u64 {
    30
}

pub fn default_settings_cache_ttl() -> u64 {
    300
}

pub fn default_permission_cache_ttl() -> u64 {
    600
}

pub fn default_network_timeout_ms() -> u64 {
    250
}

pub fn default_reserved_subdomains() -> Vec<String> {
    vec!["www".to_string(), "api".to_string(), "app".to_string()]
}

pub fn default_min_host_labels() -> usize {
    3
}

pub fn default_dedicated_max_connections() -> u32 {
    5
}

pub fn default_super_admin_roles() -> Vec<String> {
    vec!["super_admin".to_string()]
}

pub fn default_max_inheritance_depth() -> usize {
    10
}

pub fn default_log_level() -> String {
    "info".to_string()
}
