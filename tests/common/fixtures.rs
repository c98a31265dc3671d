//! Test fixtures and data factories
//!
//! All factories create real objects, not mocks.

use tenant_access::auth::context::ContextField;
use tenant_access::auth::rbac::{Permission, Role, ScopeKind};
use tenant_access::auth::{Actor, ContextRef};
use tenant_access::config::{CollectionConfig, ContextConfig};
use tenant_access::tenancy::TenantRecord;

/// Collections registered for context isolation in tests
pub fn context_config() -> ContextConfig {
    let mut product = CollectionConfig::new([ContextField::BusinessUnit, ContextField::Outlet]);
    product.table = Some("products".to_string());

    let mut customer = CollectionConfig::new([ContextField::Company]);
    customer.table = Some("customers".to_string());
    customer.allow_unscoped = false;

    ContextConfig::default()
        .with_collection("product", product)
        .with_collection("customer", customer)
}

/// Factory for tenant records
pub struct TenantFactory;

impl TenantFactory {
    pub const ACME_ID: &'static str = "org-acme";

    /// Shared tenant with a custom domain
    pub fn acme() -> TenantRecord {
        TenantRecord::new(Self::ACME_ID, "acme").with_domain("shop.acme.com")
    }

    /// Dedicated tenant that was never provisioned
    pub fn globex() -> TenantRecord {
        let mut tenant =
            TenantRecord::new("org-globex", "globex").dedicated("postgres://globex-db/globex");
        tenant.is_provisioned = false;
        tenant
    }

    /// Provisioned dedicated tenant on its own in-memory database
    pub fn initech() -> TenantRecord {
        TenantRecord::new("org-initech", "initech").dedicated("sqlite::memory:")
    }

    /// Deactivated tenant
    pub fn hooli() -> TenantRecord {
        let mut tenant = TenantRecord::new("org-hooli", "hooli");
        tenant.is_active = false;
        tenant
    }

    pub fn all() -> Vec<TenantRecord> {
        vec![Self::acme(), Self::globex(), Self::initech(), Self::hooli()]
    }
}

/// Factory for roles
pub struct RoleFactory;

impl RoleFactory {
    /// Reads products anywhere, updates them only inside its outlets
    pub fn outlet_manager() -> Role {
        Role::new("outlet-manager", "Outlet Manager")
            .with_permission(Permission::new("product-read", "product", "read"))
            .with_permission(
                Permission::new("product-update", "product", "update")
                    .with_scope(ScopeKind::Outlet),
            )
    }

    pub fn cashier() -> Role {
        Role::new("cashier", "Cashier")
            .with_permission(Permission::new("order-create", "order", "create"))
    }
}

/// Factory for actors
pub struct ActorFactory;

impl ActorFactory {
    pub fn outlet_manager() -> Actor {
        Actor::new("u-manager")
            .with_role(RoleFactory::outlet_manager())
            .with_business_units([ContextRef::new("BU1").with_slug("downtown")])
            .with_outlets(["O1"])
    }

    pub fn cashier() -> Actor {
        Actor::new("u-cashier")
            .with_role(RoleFactory::cashier())
            .with_outlets(["O2"])
    }
}
