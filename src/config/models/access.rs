//! Permission evaluation and context isolation configuration

use super::*;
use crate::auth::context::ContextField;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// RBAC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbacConfig {
    /// Role names that bypass permission evaluation entirely
    #[serde(default = "default_super_admin_roles")]
    pub super_admin_roles: Vec<String>,
    /// Maximum depth followed through `inherited_roles`
    #[serde(default = "default_max_inheritance_depth")]
    pub max_inheritance_depth: usize,
    /// Resources added to the built-in catalog
    #[serde(default)]
    pub extra_resources: Vec<String>,
    /// Actions added to the built-in catalog
    #[serde(default)]
    pub extra_actions: Vec<String>,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            super_admin_roles: default_super_admin_roles(),
            max_inheritance_depth: default_max_inheritance_depth(),
            extra_resources: Vec::new(),
            extra_actions: Vec::new(),
        }
    }
}

/// Context isolation configuration, keyed by collection name
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContextConfig {
    #[serde(default)]
    pub collections: HashMap<String, CollectionConfig>,
}

impl ContextConfig {
    /// Register a collection, returning the updated config
    pub fn with_collection(mut self, name: impl Into<String>, collection: CollectionConfig) -> Self {
        self.collections.insert(name.into(), collection);
        self
    }
}

/// Which context fields a tenant-scoped collection exposes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Backing table name (defaults to the collection name)
    #[serde(default)]
    pub table: Option<String>,
    /// Context fields present on the collection
    #[serde(default)]
    pub fields: Vec<ContextField>,
    /// Field constrained when no explicit target is named
    #[serde(default)]
    pub primary: Option<ContextField>,
    /// Column name overrides, default is the field's snake_case name
    #[serde(default)]
    pub columns: BTreeMap<ContextField, String>,
    /// Let records without a context value through the owner guard
    #[serde(default = "default_true")]
    pub allow_unscoped: bool,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            table: None,
            fields: Vec::new(),
            primary: None,
            columns: BTreeMap::new(),
            allow_unscoped: true,
        }
    }
}

impl CollectionConfig {
    pub fn new(fields: impl IntoIterator<Item = ContextField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn has(&self, field: ContextField) -> bool {
        self.fields.contains(&field)
    }

    /// The field a no-target filter constrains.
    ///
    /// An explicit `primary` wins; otherwise business unit, company, outlet in that order.
    pub fn primary_field(&self) -> Option<ContextField> {
        if let Some(primary) = self.primary {
            return self.has(primary).then_some(primary);
        }
        [
            ContextField::BusinessUnit,
            ContextField::Company,
            ContextField::Outlet,
        ]
        .into_iter()
        .find(|f| self.has(*f))
    }

    pub fn column(&self, field: ContextField) -> String {
        self.columns
            .get(&field)
            .cloned()
            .unwrap_or_else(|| field.column_name().to_string())
    }
}
