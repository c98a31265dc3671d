//! Resolve-then-route orchestration and tenant write-side invalidation

use super::resolver::TenantResolver;
use super::router::{ConnectionRouter, Route};
use super::types::{RequestHints, TenantRecord};
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::info;

/// Tenant plus the connection its requests should use
#[derive(Debug, Clone)]
pub struct TenantRoute {
    pub tenant: Option<TenantRecord>,
    pub route: Route,
}

#[derive(Clone)]
pub struct TenancyService {
    resolver: TenantResolver,
    router: Arc<ConnectionRouter>,
}

impl TenancyService {
    pub fn new(resolver: TenantResolver, router: Arc<ConnectionRouter>) -> Self {
        Self { resolver, router }
    }

    pub fn resolver(&self) -> &TenantResolver {
        &self.resolver
    }

    pub fn router(&self) -> &Arc<ConnectionRouter> {
        &self.router
    }

    /// Resolve the request's tenant and pick its connection. An unknown tenant
    /// routes to the shared connection; rejecting it is the caller's call.
    pub async fn resolve_connection(&self, hints: &RequestHints) -> Result<TenantRoute> {
        let tenant = self.resolver.resolve(hints).await?;
        let route = self.router.route(tenant.as_ref()).await;
        Ok(TenantRoute { tenant, route })
    }

    /// Apply a tenant update: purge cache entries for both the old and new
    /// identifiers, and drop the dedicated connection when its backing config
    /// changed.
    pub async fn on_tenant_updated(&self, old: &TenantRecord, new: &TenantRecord) {
        self.resolver.invalidate(old).await;
        self.resolver.invalidate(new).await;

        let config_changed = old.dedicated_uri() != new.dedicated_uri() || !new.is_active;
        if config_changed && self.router.invalidate(&old.organization_id).await {
            info!(
                "Evicted dedicated connection for tenant {} after config change",
                old.organization_id
            );
        }
    }

    /// Forget any remembered miss for the new tenant's custom domain
    pub async fn on_tenant_created(&self, record: &TenantRecord) {
        self.resolver.invalidate(record).await;
    }

    pub async fn on_tenant_deleted(&self, record: &TenantRecord) {
        self.resolver.invalidate(record).await;
        self.router.invalidate(&record.organization_id).await;
    }
}
