//! Tenant resolution and connection routing configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Tenancy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenancyConfig {
    /// Leading host labels that never name a tenant
    #[serde(default = "default_reserved_subdomains")]
    pub reserved_subdomains: Vec<String>,
    /// Minimum number of dot-separated labels for subdomain extraction
    #[serde(default = "default_min_host_labels")]
    pub min_host_labels: usize,
    /// Pool size for each dedicated tenant connection
    #[serde(default = "default_dedicated_max_connections")]
    pub dedicated_max_connections: u32,
    /// Connect timeout for dedicated tenant connections in seconds
    #[serde(default = "default_connection_timeout")]
    pub dedicated_connect_timeout: u64,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            reserved_subdomains: default_reserved_subdomains(),
            min_host_labels: default_min_host_labels(),
            dedicated_max_connections: default_dedicated_max_connections(),
            dedicated_connect_timeout: default_connection_timeout(),
        }
    }
}
