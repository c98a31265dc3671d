//! Permission evaluator

use super::catalog::PermissionCatalog;
use super::conditions::evaluate_all;
use super::graph::{EffectiveSet, RoleSource, collect_effective};
use super::resolution::resolve;
use super::scopes::scope_matches;
use super::types::{Decision, Effect, PermissionContext, ResolvedBy};
use crate::auth::Actor;
use crate::config::{CacheConfig, RbacConfig};
use crate::core::cache::CacheVersions;
use crate::utils::error::{CoreError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Decides whether an actor may perform an action on a resource.
///
/// Effective permission sets are cached per actor and version snapshot, so any
/// role, group or permission write makes older sets unreachable.
#[derive(Clone)]
pub struct PermissionEvaluator {
    config: Arc<RbacConfig>,
    catalog: Arc<PermissionCatalog>,
    source: Arc<dyn RoleSource>,
    versions: Arc<CacheVersions>,
    cache: moka::future::Cache<String, Arc<EffectiveSet>>,
}

impl PermissionEvaluator {
    pub fn new(
        config: &RbacConfig,
        cache_config: &CacheConfig,
        source: Arc<dyn RoleSource>,
        versions: Arc<CacheVersions>,
    ) -> Self {
        info!("Initializing permission evaluator");
        let cache = moka::future::Cache::builder()
            .max_capacity(cache_config.local_capacity)
            .time_to_live(Duration::from_secs(cache_config.permission_ttl))
            .build();

        Self {
            config: Arc::new(config.clone()),
            catalog: Arc::new(PermissionCatalog::from_config(config)),
            source,
            versions,
            cache,
        }
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    pub fn is_super_admin(&self, actor: &Actor) -> bool {
        actor.is_super_admin || actor.has_role_named(&self.config.super_admin_roles)
    }

    /// Effective permissions of `actor`, served from cache when the version
    /// snapshot is unchanged
    pub async fn effective_permissions(&self, actor: &Actor) -> Result<Arc<EffectiveSet>> {
        let snapshot = self.versions.snapshot().await;
        let key = format!("{}:{}", actor.id, snapshot.cache_key());

        if let Some(set) = self.cache.get(&key).await {
            debug!("Permission set cache hit for {}", key);
            return Ok(set);
        }

        debug!("Permission set cache miss for {}", key);
        let set = Arc::new(
            collect_effective(actor, self.source.as_ref(), self.config.max_inheritance_depth)
                .await?,
        );
        self.cache.insert(key, Arc::clone(&set)).await;
        Ok(set)
    }

    /// Evaluate `(resource, action)` for `actor`.
    ///
    /// Returns `Err(InvalidPermissionConfig)` for malformed conditions. An
    /// inheritance cycle yields a deny decision carrying the diagnostic.
    pub async fn evaluate(
        &self,
        actor: &Actor,
        resource: &str,
        action: &str,
        context: &PermissionContext,
    ) -> Result<Decision> {
        if self.is_super_admin(actor) {
            return Ok(Decision::super_admin());
        }

        if !self.catalog.contains(resource, action) {
            debug!("Unknown resource/action pair {}:{}", resource, action);
            return Ok(Decision::deny(
                format!("unknown resource or action {}:{}", resource, action),
                ResolvedBy::Catalog,
            ));
        }

        let set = self.effective_permissions(actor).await?;

        if set.has_config_error() {
            let mut decision = Decision::deny(
                "permission configuration error",
                ResolvedBy::ConfigError,
            );
            decision.diagnostics = set.diagnostics.clone();
            error!(
                "Denying {}:{} for actor {}: {:?}",
                resource, action, actor.id, set.diagnostics
            );
            return Ok(decision);
        }

        let projection = context.projection(actor.projection());
        let mut trace = Vec::new();
        let mut candidates = Vec::new();

        for entry in set.matching(resource, action) {
            let permission = &entry.permission;
            if !evaluate_all(&permission.conditions, &projection)? {
                trace.push(format!("{} dropped: conditions unmet", permission.id));
                continue;
            }
            if !scope_matches(permission.scope, actor, context) {
                trace.push(format!(
                    "{} dropped: scope {:?} does not match",
                    permission.id, permission.scope
                ));
                continue;
            }
            candidates.push(entry);
        }

        let Some(resolution) = resolve(&candidates, &set.resolvers) else {
            let mut decision = Decision::deny("no matching permission", ResolvedBy::DefaultDeny);
            decision.trace = trace;
            decision.diagnostics = set.diagnostics.clone();
            return Ok(decision);
        };

        trace.extend(resolution.trace);
        let winner = &resolution.winner.permission;
        let allowed = winner.effect == Effect::Allow;
        let reason = if allowed {
            format!("allowed by {} ({})", winner.id, resolution.winner.source)
        } else {
            format!("denied by {} ({})", winner.id, resolution.winner.source)
        };

        debug!(
            "Actor {} {}:{} -> {} via {}",
            actor.id, resource, action, allowed, resolution.strategy
        );

        Ok(Decision {
            allowed,
            winning_permission: Some(winner.clone()),
            reason,
            resolved_by: ResolvedBy::Strategy(resolution.strategy),
            trace,
            diagnostics: set.diagnostics.clone(),
        })
    }

    /// Evaluate and turn anything but an allow into `Forbidden`.
    ///
    /// Configuration errors are logged and fail closed.
    pub async fn authorize(
        &self,
        actor: &Actor,
        resource: &str,
        action: &str,
        context: &PermissionContext,
    ) -> Result<Decision> {
        let decision = match self.evaluate(actor, resource, action, context).await {
            Ok(decision) => decision,
            Err(CoreError::InvalidPermissionConfig(detail)) => {
                error!(
                    "Invalid permission configuration for {}:{} (actor {}): {}",
                    resource, action, actor.id, detail
                );
                return Err(CoreError::forbidden(format!(
                    "You do not have permission to {} {}",
                    action, resource
                )));
            }
            Err(e) => return Err(e),
        };

        if decision.allowed {
            Ok(decision)
        } else {
            Err(CoreError::forbidden(format!(
                "You do not have permission to {} {}",
                action, resource
            )))
        }
    }

    /// Drop every cached permission set in this process
    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }
}
