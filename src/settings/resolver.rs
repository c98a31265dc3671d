//! Settings Cascade Resolver

use super::path::SettingKey;
use super::store::SettingsStore;
use super::types::{ResolvedSetting, SINGLETON_OWNER, SettingsContext, SettingsLevel};
use crate::config::CacheConfig;
use crate::core::cache::{LayeredCache, NetworkCache};
use crate::core::task::run_detached;
use crate::utils::error::{CoreError, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Resolves effective settings by walking Outlet, Business Unit, Organization,
/// Platform and System in that order.
///
/// Level documents are cached whole; a missing document is cached as `null`
/// so repeated misses stay off the store.
#[derive(Clone)]
pub struct SettingsCascadeResolver {
    store: Arc<dyn SettingsStore>,
    cache: LayeredCache<Value>,
}

impl SettingsCascadeResolver {
    pub fn new(store: Arc<dyn SettingsStore>, network: Arc<dyn NetworkCache>, config: &CacheConfig) -> Self {
        let cache = LayeredCache::new(
            "settings",
            network,
            config.local_capacity,
            Duration::from_secs(config.settings_ttl),
            config.network_timeout(),
        );
        Self { store, cache }
    }

    fn document_key(level: SettingsLevel, owner_id: &str) -> String {
        format!("{}:{}", level, owner_id)
    }

    /// Effective value of `key`, or `default` when no level sets it
    pub async fn resolve_setting(&self, key: &str, ctx: &SettingsContext, default: Value) -> Result<Value> {
        Ok(self.resolve_with_source(key, ctx, default).await?.value)
    }

    /// Like [`resolve_setting`](Self::resolve_setting), also reporting the level
    /// that supplied the value
    pub async fn resolve_with_source(
        &self,
        key: &str,
        ctx: &SettingsContext,
        default: Value,
    ) -> Result<ResolvedSetting> {
        let key = SettingKey::parse(key)?;
        let this = self.clone();
        let ctx = ctx.clone();
        run_detached(async move { this.cascade(&key, &ctx, default).await }).await
    }

    async fn cascade(&self, key: &SettingKey, ctx: &SettingsContext, default: Value) -> Result<ResolvedSetting> {
        let mut business_unit = ctx.business_unit_id.clone();

        for level in SettingsLevel::CASCADE {
            let owner = match level {
                SettingsLevel::Outlet => ctx.outlet_id.clone(),
                SettingsLevel::BusinessUnit => {
                    if business_unit.is_none() {
                        if let Some(outlet) = &ctx.outlet_id {
                            business_unit = self.parent_business_unit(outlet).await?;
                        }
                    }
                    business_unit.clone()
                }
                SettingsLevel::Organization => ctx.organization_id.clone(),
                SettingsLevel::Platform | SettingsLevel::System => Some(SINGLETON_OWNER.to_string()),
            };
            let Some(owner) = owner else {
                continue;
            };

            let document = self.document(level, &owner).await?;
            if let Some(value) = key.lookup(&document) {
                debug!("Setting {} resolved at {} level", key, level);
                return Ok(ResolvedSetting {
                    value: value.clone(),
                    source: Some(level),
                });
            }
        }

        debug!("Setting {} not set at any level, using default", key);
        Ok(ResolvedSetting {
            value: default,
            source: None,
        })
    }

    async fn parent_business_unit(&self, outlet_id: &str) -> Result<Option<String>> {
        let cache_key = format!("outlet-parent:{}", outlet_id);
        if let Some(cached) = self.cache.get(&cache_key).await {
            return Ok(cached.as_str().map(str::to_string));
        }

        let parent = self.store.outlet_business_unit(outlet_id).await?;
        let cached = parent.clone().map(Value::String).unwrap_or(Value::Null);
        self.cache.set(&cache_key, cached).await;
        Ok(parent)
    }

    async fn document(&self, level: SettingsLevel, owner_id: &str) -> Result<Value> {
        let cache_key = Self::document_key(level, owner_id);
        if let Some(document) = self.cache.get(&cache_key).await {
            debug!("Settings cache hit for {}", cache_key);
            return Ok(document);
        }

        debug!("Settings cache miss for {}", cache_key);
        let document = self.load(level, owner_id).await?.unwrap_or(Value::Null);
        self.cache.set(&cache_key, document.clone()).await;
        Ok(document)
    }

    async fn load(&self, level: SettingsLevel, owner_id: &str) -> Result<Option<Value>> {
        if level.is_singleton() {
            self.store.load_singleton(level).await.map(Some)
        } else {
            self.store.load_document(level, owner_id).await
        }
    }

    fn owner_for(level: SettingsLevel, owner_id: Option<&str>) -> Result<String> {
        if level.is_singleton() {
            return Ok(SINGLETON_OWNER.to_string());
        }
        owner_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| CoreError::validation(format!("{} settings need an owner id", level)))
    }

    /// Write `value` at `key` in one level's document and drop its cache entry.
    ///
    /// `owner_id` is ignored for Platform and System.
    pub async fn set_value(
        &self,
        level: SettingsLevel,
        owner_id: Option<&str>,
        key: &str,
        value: Value,
    ) -> Result<()> {
        let key = SettingKey::parse(key)?;
        let owner = Self::owner_for(level, owner_id)?;

        let mut document = match self.load(level, &owner).await? {
            Some(document @ Value::Object(_)) => document,
            _ => Value::Object(Map::new()),
        };
        key.assign(&mut document, value);
        self.store.save_document(level, &owner, document).await?;
        self.invalidate(level, Some(&owner)).await?;

        info!("Updated setting {} at {} level for {}", key, level, owner);
        Ok(())
    }

    /// Drop the cached document for one level owner
    pub async fn invalidate(&self, level: SettingsLevel, owner_id: Option<&str>) -> Result<()> {
        let owner = Self::owner_for(level, owner_id)?;
        self.cache.invalidate(&Self::document_key(level, &owner)).await;
        Ok(())
    }

    /// Drop the cached parent lookup after an outlet moves business units
    pub async fn invalidate_outlet_parent(&self, outlet_id: &str) {
        self.cache.invalidate(&format!("outlet-parent:{}", outlet_id)).await;
    }

    /// `modules.{module}.enabled`, disabled unless some level turns it on
    pub async fn is_module_enabled(&self, module: &str, ctx: &SettingsContext) -> Result<bool> {
        let value = self
            .resolve_setting(&format!("modules.{}.enabled", module), ctx, Value::Bool(false))
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}
