//! Network cache abstraction

use crate::utils::error::{CoreError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cache tier shared between processes.
///
/// Values are JSON strings. `ttl` is in seconds.
#[async_trait]
pub trait NetworkCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Atomically increment a counter, returning the new value
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Disabled tiers are skipped without a round trip
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Process-local stand-in for the network tier.
///
/// Shared through an `Arc`, it behaves like one Redis instance seen by several
/// resolvers. It can be switched offline to exercise fallback paths.
#[derive(Debug, Default)]
pub struct MemoryNetworkCache {
    entries: DashMap<String, String>,
    offline: AtomicBool,
}

impl MemoryNetworkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail until switched back online
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CoreError::Cache("network cache offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NetworkCache for MemoryNetworkCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_online()?;
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str, _ttl: Option<u64>) -> Result<()> {
        self.check_online()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_online()?;
        self.entries.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        self.check_online()?;
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| "0".to_string());
        let next = entry
            .parse::<i64>()
            .map_err(|e| CoreError::Cache(format!("value at {} is not a counter: {}", key, e)))?
            + 1;
        *entry = next.to_string();
        Ok(next)
    }
}
