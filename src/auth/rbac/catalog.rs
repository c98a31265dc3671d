//! Closed catalog of resource and action names
//!
//! Anything outside the catalog is denied before the permission graph is
//! consulted, so a typo can never act as a wildcard.

use crate::config::RbacConfig;
use std::collections::HashSet;

const BUILTIN_RESOURCES: &[&str] = &[
    "organization",
    "company",
    "businessUnit",
    "outlet",
    "department",
    "branch",
    "user",
    "role",
    "permission",
    "permissionGroup",
    "scopeAssignment",
    "settings",
    "module",
    "product",
    "category",
    "inventory",
    "order",
    "invoice",
    "payment",
    "customer",
    "vendor",
    "supplier",
    "purchaseOrder",
    "promotion",
    "report",
    "analytics",
    "auditLog",
];

const BUILTIN_ACTIONS: &[&str] = &[
    "create", "read", "update", "delete", "list", "approve", "reject", "cancel", "export",
    "import", "assign", "manage", "publish", "void", "refund",
];

#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    resources: HashSet<String>,
    actions: HashSet<String>,
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self {
            resources: BUILTIN_RESOURCES.iter().map(|s| s.to_string()).collect(),
            actions: BUILTIN_ACTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PermissionCatalog {
    /// Built-in names plus the configured extras
    pub fn from_config(config: &RbacConfig) -> Self {
        let mut catalog = Self::default();
        catalog
            .resources
            .extend(config.extra_resources.iter().cloned());
        catalog.actions.extend(config.extra_actions.iter().cloned());
        catalog
    }

    pub fn contains(&self, resource: &str, action: &str) -> bool {
        self.resources.contains(resource) && self.actions.contains(action)
    }

    pub fn has_resource(&self, resource: &str) -> bool {
        self.resources.contains(resource)
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.actions.contains(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = PermissionCatalog::default();
        assert!(catalog.contains("product", "update"));
        assert!(catalog.contains("businessUnit", "read"));
        assert!(!catalog.contains("product", "*"));
        assert!(!catalog.contains("*", "read"));
        assert!(!catalog.contains("Product", "update"));
    }

    #[test]
    fn test_extras_from_config() {
        let config = RbacConfig {
            extra_resources: vec!["loyaltyCard".to_string()],
            extra_actions: vec!["redeem".to_string()],
            ..Default::default()
        };
        let catalog = PermissionCatalog::from_config(&config);
        assert!(catalog.contains("loyaltyCard", "redeem"));
        assert!(catalog.contains("order", "redeem"));
    }
}
