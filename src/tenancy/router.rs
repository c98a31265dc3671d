//! Connection Router
//!
//! Shared tenants use the single shared connection. Dedicated tenants get a
//! lazily created connection keyed by organization id that lives until the
//! router invalidates it.

use super::types::{DeploymentType, TenantRecord};
use crate::config::TenancyConfig;
use crate::utils::error::{CoreError, Result};
use crate::utils::logging::redact_url;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Opens dedicated tenant connections
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, uri: &str) -> Result<DatabaseConnection>;
}

/// SeaORM connector sized from the tenancy config
#[derive(Debug, Clone)]
pub struct SeaOrmConnector {
    max_connections: u32,
    connect_timeout: Duration,
}

impl SeaOrmConnector {
    pub fn new(config: &TenancyConfig) -> Self {
        Self {
            max_connections: config.dedicated_max_connections,
            connect_timeout: Duration::from_secs(config.dedicated_connect_timeout),
        }
    }
}

#[async_trait]
impl Connector for SeaOrmConnector {
    async fn connect(&self, uri: &str) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(uri.to_string());
        opt.max_connections(self.max_connections)
            .min_connections(1)
            .connect_timeout(self.connect_timeout)
            .acquire_timeout(self.connect_timeout)
            .sqlx_logging(false);

        Database::connect(opt).await.map_err(|e| {
            CoreError::ConnectionUnavailable(format!("{}: {}", redact_url(uri), e))
        })
    }
}

/// How a request was routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Shared,
    Dedicated,
    /// Dedicated connection could not be established, shared used instead
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub connection: Arc<DatabaseConnection>,
    pub kind: RouteKind,
}

struct DedicatedSlot {
    uri: String,
    connection: OnceCell<Arc<DatabaseConnection>>,
}

impl DedicatedSlot {
    fn new(uri: &str) -> Arc<Self> {
        Arc::new(Self {
            uri: uri.to_string(),
            connection: OnceCell::new(),
        })
    }
}

pub struct ConnectionRouter {
    shared: Arc<DatabaseConnection>,
    dedicated: DashMap<String, Arc<DedicatedSlot>>,
    connector: Arc<dyn Connector>,
}

impl ConnectionRouter {
    pub fn new(shared: Arc<DatabaseConnection>, connector: Arc<dyn Connector>) -> Self {
        Self {
            shared,
            dedicated: DashMap::new(),
            connector,
        }
    }

    pub fn shared(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.shared)
    }

    fn shared_route(&self, kind: RouteKind) -> Route {
        Route {
            connection: self.shared(),
            kind,
        }
    }

    /// Connection for `tenant`. Never fails: a dedicated connection that cannot
    /// be opened degrades to the shared one.
    pub async fn route(&self, tenant: Option<&TenantRecord>) -> Route {
        let Some(tenant) = tenant else {
            return self.shared_route(RouteKind::Shared);
        };

        let Some(uri) = tenant.dedicated_uri() else {
            if tenant.deployment_type == DeploymentType::Dedicated {
                warn!(
                    "Tenant {} is dedicated but not provisioned, using shared connection",
                    tenant.organization_id
                );
            }
            return self.shared_route(RouteKind::Shared);
        };

        match self.dedicated_connection(&tenant.organization_id, uri).await {
            Ok(connection) => Route {
                connection,
                kind: RouteKind::Dedicated,
            },
            Err(e) => {
                warn!(
                    "Dedicated connection for tenant {} unavailable, falling back to shared: {}",
                    tenant.organization_id, e
                );
                self.shared_route(RouteKind::Fallback)
            }
        }
    }

    async fn dedicated_connection(&self, tenant_id: &str, uri: &str) -> Result<Arc<DatabaseConnection>> {
        let (slot, replaced) = match self.dedicated.entry(tenant_id.to_string()) {
            Entry::Occupied(entry) if entry.get().uri == uri => (Arc::clone(entry.get()), None),
            Entry::Occupied(mut entry) => {
                let slot = DedicatedSlot::new(uri);
                let old = entry.insert(Arc::clone(&slot));
                (slot, Some(old))
            }
            Entry::Vacant(entry) => {
                let slot = DedicatedSlot::new(uri);
                entry.insert(Arc::clone(&slot));
                (slot, None)
            }
        };

        if let Some(old) = replaced {
            info!("Database URI changed for tenant {}, replacing connection", tenant_id);
            Self::retire(tenant_id, old).await;
        }

        let connection = slot
            .connection
            .get_or_try_init(|| async {
                let connection = self.connector.connect(uri).await?;
                info!(
                    "Opened dedicated connection for tenant {} ({})",
                    tenant_id,
                    redact_url(uri)
                );
                Ok::<_, CoreError>(Arc::new(connection))
            })
            .await?;

        Ok(Arc::clone(connection))
    }

    /// Evict and close the dedicated connection for `tenant_id`.
    ///
    /// Returns whether a connection slot existed.
    pub async fn invalidate(&self, tenant_id: &str) -> bool {
        match self.dedicated.remove(tenant_id) {
            Some((_, slot)) => {
                Self::retire(tenant_id, slot).await;
                true
            }
            None => false,
        }
    }

    /// Close a slot's connection once nothing else holds it. In-flight queries
    /// keep their `Arc` and the pool is released when the last one drops.
    async fn retire(tenant_id: &str, slot: Arc<DedicatedSlot>) {
        let Ok(slot) = Arc::try_unwrap(slot) else {
            debug!("Connection slot for tenant {} still referenced, releasing lazily", tenant_id);
            return;
        };
        let Some(connection) = slot.connection.into_inner() else {
            return;
        };
        match Arc::try_unwrap(connection) {
            Ok(connection) => match connection.close().await {
                Ok(()) => info!("Closed dedicated connection for tenant {}", tenant_id),
                Err(e) => warn!("Error closing dedicated connection for tenant {}: {}", tenant_id, e),
            },
            Err(_) => debug!(
                "Dedicated connection for tenant {} in use, closing after last query",
                tenant_id
            ),
        }
    }

    /// Number of tenants with a dedicated slot
    pub fn dedicated_count(&self) -> usize {
        self.dedicated.len()
    }

    pub fn has_dedicated(&self, tenant_id: &str) -> bool {
        self.dedicated
            .get(tenant_id)
            .is_some_and(|slot| slot.connection.initialized())
    }
}

impl std::fmt::Debug for ConnectionRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRouter")
            .field("dedicated", &self.dedicated.len())
            .finish()
    }
}
