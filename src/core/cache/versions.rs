//! Version counters for permission-related entities
//!
//! Any write to a role, permission or permission group bumps its counter.
//! Cached permission sets are keyed by the counters they were computed under,
//! so a bump makes every older entry unreachable.

use super::types::NetworkCache;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Role,
    Permission,
    PermissionGroup,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Role => "role",
            EntityType::Permission => "permission",
            EntityType::PermissionGroup => "permission_group",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters observed at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VersionSnapshot {
    pub role: u64,
    pub permission: u64,
    pub permission_group: u64,
}

impl VersionSnapshot {
    pub fn cache_key(&self) -> String {
        format!("r{}.p{}.g{}", self.role, self.permission, self.permission_group)
    }
}

/// Version counters kept in the network tier with a local mirror.
///
/// The local counter only moves forward, so a process that lost the network
/// tier still invalidates its own entries on writes it performs.
pub struct CacheVersions {
    network: Arc<dyn NetworkCache>,
    local: DashMap<EntityType, u64>,
    timeout: Duration,
}

impl CacheVersions {
    pub fn new(network: Arc<dyn NetworkCache>, timeout: Duration) -> Self {
        Self {
            network,
            local: DashMap::new(),
            timeout,
        }
    }

    fn key(entity: EntityType) -> String {
        format!("version:{}", entity)
    }

    fn local_value(&self, entity: EntityType) -> u64 {
        self.local.get(&entity).map(|v| *v).unwrap_or(0)
    }

    fn observe(&self, entity: EntityType, value: u64) -> u64 {
        let mut entry = self.local.entry(entity).or_insert(0);
        if value > *entry {
            *entry = value;
        }
        *entry
    }

    /// Increment the counter for `entity` and return the new version
    pub async fn bump(&self, entity: EntityType) -> u64 {
        let local = {
            let mut entry = self.local.entry(entity).or_insert(0);
            *entry += 1;
            *entry
        };

        if !self.network.is_enabled() {
            return local;
        }

        match tokio::time::timeout(self.timeout, self.network.incr(&Self::key(entity))).await {
            Ok(Ok(remote)) => {
                let version = self.observe(entity, remote.max(0) as u64);
                debug!("Bumped {} version to {}", entity, version);
                version
            }
            Ok(Err(e)) => {
                warn!("Failed to bump {} version in network cache: {}", entity, e);
                local
            }
            Err(_) => {
                warn!("Timed out bumping {} version in network cache", entity);
                local
            }
        }
    }

    /// Current version of `entity`, preferring the shared counter
    pub async fn current(&self, entity: EntityType) -> u64 {
        if !self.network.is_enabled() {
            return self.local_value(entity);
        }

        match tokio::time::timeout(self.timeout, self.network.get(&Self::key(entity))).await {
            Ok(Ok(Some(raw))) => match raw.parse::<u64>() {
                Ok(remote) => self.observe(entity, remote),
                Err(_) => self.local_value(entity),
            },
            Ok(Ok(None)) => self.local_value(entity),
            Ok(Err(e)) => {
                debug!("Reading {} version failed, using local: {}", entity, e);
                self.local_value(entity)
            }
            Err(_) => self.local_value(entity),
        }
    }

    pub async fn snapshot(&self) -> VersionSnapshot {
        VersionSnapshot {
            role: self.current(EntityType::Role).await,
            permission: self.current(EntityType::Permission).await,
            permission_group: self.current(EntityType::PermissionGroup).await,
        }
    }
}
