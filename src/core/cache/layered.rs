//! Network tier first, local tier as fallback

use super::types::NetworkCache;
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Read-through cache over a shared network tier and a bounded local tier.
///
/// Network failures and timeouts never surface to callers; they are logged and
/// the local tier answers instead. A network miss is a miss.
pub struct LayeredCache<V> {
    namespace: String,
    network: Arc<dyn NetworkCache>,
    local: moka::future::Cache<String, V>,
    ttl: Duration,
    timeout: Duration,
    _marker: PhantomData<fn() -> V>,
}

impl<V> Clone for LayeredCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            namespace: self.namespace.clone(),
            network: Arc::clone(&self.network),
            local: self.local.clone(),
            ttl: self.ttl,
            timeout: self.timeout,
            _marker: PhantomData,
        }
    }
}

impl<V> LayeredCache<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(
        namespace: impl Into<String>,
        network: Arc<dyn NetworkCache>,
        capacity: u64,
        ttl: Duration,
        timeout: Duration,
    ) -> Self {
        let local = moka::future::Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self {
            namespace: namespace.into(),
            network,
            local,
            ttl,
            timeout,
            _marker: PhantomData,
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    /// Run a network call under the configured timeout. `None` means the tier
    /// did not answer and the caller should fall back.
    async fn guarded<T, F>(&self, op: &str, key: &str, fut: F) -> Option<T>
    where
        F: Future<Output = crate::utils::error::Result<T>>,
    {
        if !self.network.is_enabled() {
            return None;
        }
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!("Network cache {} failed for {}: {}", op, key, e);
                None
            }
            Err(_) => {
                warn!("Network cache {} timed out for {}", op, key);
                None
            }
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let full_key = self.full_key(key);

        // Once the network tier answers it is authoritative, misses included,
        // so an invalidation from another process also evicts our local copy.
        // The local tier only answers while the network tier is unreachable.
        match self
            .guarded("get", &full_key, self.network.get(&full_key))
            .await
        {
            Some(Some(raw)) => match serde_json::from_str::<V>(&raw) {
                Ok(value) => {
                    self.local.insert(full_key, value.clone()).await;
                    Some(value)
                }
                Err(e) => {
                    warn!("Discarding undecodable cache entry {}: {}", full_key, e);
                    self.local.invalidate(&full_key).await;
                    None
                }
            },
            Some(None) => {
                self.local.invalidate(&full_key).await;
                None
            }
            None => {
                let hit = self.local.get(&full_key).await;
                if hit.is_some() {
                    debug!("Local cache hit for {}", full_key);
                }
                hit
            }
        }
    }

    pub async fn set(&self, key: &str, value: V) {
        let full_key = self.full_key(key);

        match serde_json::to_string(&value) {
            Ok(raw) => {
                self.guarded(
                    "set",
                    &full_key,
                    self.network.set(&full_key, &raw, Some(self.ttl.as_secs())),
                )
                .await;
            }
            Err(e) => warn!("Failed to encode cache entry {}: {}", full_key, e),
        }

        self.local.insert(full_key, value).await;
    }

    pub async fn invalidate(&self, key: &str) {
        let full_key = self.full_key(key);
        self.local.invalidate(&full_key).await;
        self.guarded("delete", &full_key, self.network.delete(&full_key))
            .await;
    }

    /// Drop every local entry. The network tier expires on its own TTL.
    pub fn clear_local(&self) {
        self.local.invalidate_all();
    }
}
