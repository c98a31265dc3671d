//! Tenant Resolver

use super::hostname::{extract_subdomain, normalize_host};
use super::types::{RequestHints, TenantKey, TenantRecord, TenantStore};
use crate::config::{CacheConfig, TenancyConfig};
use crate::core::cache::{LayeredCache, NetworkCache};
use crate::core::task::run_detached;
use crate::utils::error::{CoreError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Maps request hints to a tenant record.
///
/// Lookup order is custom domain, host subdomain, explicit id, explicit slug.
/// Each step reads the cache before the store, and a hit is cached under
/// every key the record is reachable by. Misses are not cached, except for
/// custom domains: a subdomain host tries its full name as a domain first on
/// every request, so an unknown domain is remembered for a short while.
#[derive(Clone)]
pub struct TenantResolver {
    store: Arc<dyn TenantStore>,
    cache: LayeredCache<TenantRecord>,
    domain_misses: LayeredCache<bool>,
    config: Arc<TenancyConfig>,
}

impl TenantResolver {
    pub fn new(
        store: Arc<dyn TenantStore>,
        network: Arc<dyn NetworkCache>,
        cache_config: &CacheConfig,
        config: TenancyConfig,
    ) -> Self {
        let cache = LayeredCache::new(
            "tenant",
            Arc::clone(&network),
            cache_config.local_capacity,
            Duration::from_secs(cache_config.tenant_ttl),
            cache_config.network_timeout(),
        );
        let domain_misses = LayeredCache::new(
            "tenant-miss",
            network,
            cache_config.local_capacity,
            Duration::from_secs(cache_config.tenant_miss_ttl),
            cache_config.network_timeout(),
        );

        Self {
            store,
            cache,
            domain_misses,
            config: Arc::new(config),
        }
    }

    /// Resolve the tenant for a request, `None` when nothing matches.
    ///
    /// The lookup runs detached so a cancelled caller still leaves the cache
    /// populated.
    pub async fn resolve(&self, hints: &RequestHints) -> Result<Option<TenantRecord>> {
        let this = self.clone();
        let hints = hints.clone();
        run_detached(async move { this.resolve_in_order(&hints).await }).await
    }

    /// Like [`resolve`](Self::resolve) but a miss is `TenantNotFound`
    pub async fn require(&self, hints: &RequestHints) -> Result<TenantRecord> {
        self.resolve(hints).await?.ok_or_else(|| {
            CoreError::TenantNotFound(format!(
                "no active tenant for host={:?} id={:?} slug={:?}",
                hints.host, hints.tenant_id, hints.tenant_slug
            ))
        })
    }

    fn candidates(&self, hints: &RequestHints) -> Vec<TenantKey> {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let mut keys = Vec::with_capacity(4);
        if let Some(host) = hints.host.as_deref().and_then(normalize_host) {
            let subdomain = extract_subdomain(
                &host,
                &self.config.reserved_subdomains,
                self.config.min_host_labels,
            );
            keys.push(TenantKey::Domain(host));
            if let Some(slug) = subdomain {
                keys.push(TenantKey::Slug(slug));
            }
        }
        if let Some(id) = non_empty(&hints.tenant_id) {
            keys.push(TenantKey::Id(id));
        }
        if let Some(slug) = non_empty(&hints.tenant_slug) {
            keys.push(TenantKey::Slug(slug.to_ascii_lowercase()));
        }
        keys
    }

    async fn resolve_in_order(&self, hints: &RequestHints) -> Result<Option<TenantRecord>> {
        for key in self.candidates(hints) {
            if let Some(record) = self.lookup(&key).await? {
                return Ok(Some(record));
            }
        }
        debug!("No tenant matched {:?}", hints);
        Ok(None)
    }

    async fn lookup(&self, key: &TenantKey) -> Result<Option<TenantRecord>> {
        if let Some(record) = self.cache.get(&key.cache_key()).await {
            debug!("Tenant cache hit for {}", key);
            return Ok(record.is_active.then_some(record));
        }

        debug!("Tenant cache miss for {}", key);
        let record = match key {
            TenantKey::Domain(domain) => {
                if self.domain_misses.get(&key.cache_key()).await.is_some() {
                    debug!("Domain {} recently had no tenant", domain);
                    return Ok(None);
                }
                let record = self.store.find_by_domain(domain).await?;
                if record.is_none() {
                    self.domain_misses.set(&key.cache_key(), true).await;
                }
                record
            }
            TenantKey::Slug(slug) => self.store.find_by_slug(slug).await?,
            TenantKey::Id(id) => self.store.find_by_id(id).await?,
        };

        match record {
            Some(record) if record.is_active => {
                self.populate(&record).await;
                Ok(Some(record))
            }
            Some(record) => {
                debug!("Tenant {} is inactive", record.organization_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn populate(&self, record: &TenantRecord) {
        for key in record.cache_keys() {
            self.cache.set(&key.cache_key(), record.clone()).await;
        }
    }

    /// Purge `record` from the cache under all of its keys
    pub async fn invalidate(&self, record: &TenantRecord) {
        for key in record.cache_keys() {
            if matches!(key, TenantKey::Domain(_)) {
                self.domain_misses.invalidate(&key.cache_key()).await;
            }
            self.cache.invalidate(&key.cache_key()).await;
        }
        debug!("Invalidated tenant cache for {}", record.organization_id);
    }
}
