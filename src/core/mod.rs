//! Core wiring for the access engine
//!
//! [`AccessCore`] builds every component from one [`Config`] and hands out
//! shared handles. Request state (tenant, actor) is never stored here; callers
//! pass it explicitly on every call.

pub mod cache;
pub mod task;

use crate::auth::Actor;
use crate::auth::context::{AssignmentRegistry, ContextScopeGuard, ResourceOwnerGuard};
use crate::auth::rbac::{PermissionEvaluator, RoleRegistry};
use crate::config::Config;
use crate::settings::SettingsCascadeResolver;
use crate::storage::database::SeaOrmDatabase;
use crate::storage::redis::RedisPool;
use crate::tenancy::{ConnectionRouter, SeaOrmConnector, TenancyService, TenantRecord, TenantResolver};
use crate::utils::error::Result;
use cache::{CacheVersions, EntityType, NetworkCache};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Every access-control component, wired against one shared database and one
/// network cache
#[derive(Clone)]
pub struct AccessCore {
    config: Arc<Config>,
    database: SeaOrmDatabase,
    redis: Arc<RedisPool>,
    versions: Arc<CacheVersions>,
    roles: Arc<RoleRegistry>,
    assignments: Arc<AssignmentRegistry>,
    evaluator: PermissionEvaluator,
    scope_guard: ContextScopeGuard,
    owner_guard: ResourceOwnerGuard,
    tenancy: TenancyService,
    settings: SettingsCascadeResolver,
}

impl AccessCore {
    /// Connect storage, run migrations and build every component
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing access core");
        config.validate()?;
        let config = Arc::new(config);

        debug!("Connecting network cache");
        let redis = Arc::new(RedisPool::connect_or_noop(&config.storage.redis).await);
        let network: Arc<dyn NetworkCache> = redis.clone();

        debug!("Connecting shared database");
        let database = SeaOrmDatabase::new(&config.storage.database).await?;
        database.migrate().await?;

        let versions = Arc::new(CacheVersions::new(
            Arc::clone(&network),
            config.cache.network_timeout(),
        ));
        let roles = Arc::new(RoleRegistry::new(Arc::clone(&versions)));
        let evaluator = PermissionEvaluator::new(
            &config.rbac,
            &config.cache,
            roles.clone(),
            Arc::clone(&versions),
        );

        let context_config = Arc::new(config.context.clone());
        let super_admin_roles = config.rbac.super_admin_roles.clone();
        let scope_guard = ContextScopeGuard::new(Arc::clone(&context_config))
            .with_super_admin_roles(super_admin_roles.clone());
        let owner_guard =
            ResourceOwnerGuard::new(context_config, Arc::new(database.context_loader()))
                .with_super_admin_roles(super_admin_roles);

        let resolver = TenantResolver::new(
            Arc::new(database.tenant_store()),
            Arc::clone(&network),
            &config.cache,
            config.tenancy.clone(),
        );
        let router = Arc::new(ConnectionRouter::new(
            database.connection(),
            Arc::new(SeaOrmConnector::new(&config.tenancy)),
        ));
        let tenancy = TenancyService::new(resolver, router);

        let settings = SettingsCascadeResolver::new(
            Arc::new(database.settings_store()),
            network,
            &config.cache,
        );

        info!("Access core initialized");
        Ok(Self {
            config,
            database,
            redis,
            versions,
            roles,
            assignments: Arc::new(AssignmentRegistry::new()),
            evaluator,
            scope_guard,
            owner_guard,
            tenancy,
            settings,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &SeaOrmDatabase {
        &self.database
    }

    pub fn roles(&self) -> &Arc<RoleRegistry> {
        &self.roles
    }

    pub fn assignments(&self) -> &Arc<AssignmentRegistry> {
        &self.assignments
    }

    pub fn evaluator(&self) -> &PermissionEvaluator {
        &self.evaluator
    }

    pub fn scope_guard(&self) -> &ContextScopeGuard {
        &self.scope_guard
    }

    pub fn owner_guard(&self) -> &ResourceOwnerGuard {
        &self.owner_guard
    }

    pub fn tenancy(&self) -> &TenancyService {
        &self.tenancy
    }

    pub fn tenant_resolver(&self) -> &TenantResolver {
        self.tenancy.resolver()
    }

    pub fn router(&self) -> &Arc<ConnectionRouter> {
        self.tenancy.router()
    }

    pub fn settings(&self) -> &SettingsCascadeResolver {
        &self.settings
    }

    /// Replace the actor's context memberships with those of its effective
    /// scope assignments
    pub fn load_memberships(&self, actor: &mut Actor) {
        self.assignments
            .memberships(&actor.id, Utc::now())
            .apply_to(actor);
    }

    /// Invalidation signal for writers of roles, permissions and groups
    pub async fn bump_version(&self, entity: EntityType) -> u64 {
        self.versions.bump(entity).await
    }

    /// Invalidation signal for tenant writers
    pub async fn invalidate_tenant(&self, tenant: &TenantRecord) {
        self.tenancy.on_tenant_deleted(tenant).await;
    }

    /// Check the shared database and the network cache
    pub async fn health_check(&self) -> Result<()> {
        self.database.health_check().await?;
        self.redis.health_check().await?;
        Ok(())
    }
}
