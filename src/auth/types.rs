//! The authenticated identity every decision is made for

use super::context::ContextField;
use super::rbac::{Permission, Role};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A context membership, addressable by id or slug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl ContextRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.slug.as_deref() == Some(key)
    }
}

impl From<&str> for ContextRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ContextRef {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Actor as produced by the authentication step.
///
/// Roles arrive pre-populated with their permissions, groups and inherited
/// role ids. Memberships are resolved once per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub direct_permissions: Vec<Permission>,
    #[serde(default)]
    pub companies: Vec<ContextRef>,
    #[serde(default)]
    pub business_units: Vec<ContextRef>,
    #[serde(default)]
    pub outlets: Vec<ContextRef>,
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub departments: Vec<String>,
    #[serde(default)]
    pub vendor_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub is_super_admin: bool,
}

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.direct_permissions.push(permission);
        self
    }

    pub fn with_companies<I, R>(mut self, companies: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ContextRef>,
    {
        self.companies = companies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_business_units<I, R>(mut self, business_units: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ContextRef>,
    {
        self.business_units = business_units.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outlets<I, R>(mut self, outlets: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ContextRef>,
    {
        self.outlets = outlets.into_iter().map(Into::into).collect();
        self
    }

    pub fn super_admin(mut self) -> Self {
        self.is_super_admin = true;
        self
    }

    /// Memberships held at one context level
    pub fn memberships(&self, field: ContextField) -> &[ContextRef] {
        match field {
            ContextField::Company => &self.companies,
            ContextField::BusinessUnit => &self.business_units,
            ContextField::Outlet => &self.outlets,
        }
    }

    /// Find the membership matching `key` by id or slug
    pub fn membership(&self, field: ContextField, key: &str) -> Option<&ContextRef> {
        self.memberships(field).iter().find(|m| m.matches(key))
    }

    pub fn is_member(&self, field: ContextField, key: &str) -> bool {
        self.membership(field, key).is_some()
    }

    pub fn has_role_named(&self, names: &[String]) -> bool {
        self.roles
            .iter()
            .any(|r| r.is_active && names.iter().any(|n| n == &r.name))
    }

    /// JSON view used as the `user` root in condition paths
    pub fn projection(&self) -> Value {
        let ids = |refs: &[ContextRef]| refs.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
        let mut map = Map::new();
        map.insert("id".to_string(), json!(self.id));
        map.insert(
            "roles".to_string(),
            json!(self.roles.iter().map(|r| r.name.clone()).collect::<Vec<_>>()),
        );
        map.insert("companies".to_string(), json!(ids(&self.companies)));
        map.insert("businessUnits".to_string(), json!(ids(&self.business_units)));
        map.insert("outlets".to_string(), json!(ids(&self.outlets)));
        map.insert("branches".to_string(), json!(self.branches));
        map.insert("departments".to_string(), json!(self.departments));
        map.insert("vendorId".to_string(), json!(self.vendor_id));
        map.insert("region".to_string(), json!(self.region));
        Value::Object(map)
    }
}

/// Attributes of the concrete thing being acted on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    /// Free-form attributes addressable by condition paths
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_by_id_or_slug() {
        let actor = Actor::new("u1").with_business_units([
            ContextRef::new("BU1").with_slug("jakarta"),
            ContextRef::new("BU2"),
        ]);

        assert!(actor.is_member(ContextField::BusinessUnit, "BU1"));
        assert!(actor.is_member(ContextField::BusinessUnit, "jakarta"));
        assert_eq!(
            actor.membership(ContextField::BusinessUnit, "jakarta").unwrap().id,
            "BU1"
        );
        assert!(!actor.is_member(ContextField::BusinessUnit, "BU3"));
        assert!(!actor.is_member(ContextField::Outlet, "BU1"));
    }

    #[test]
    fn test_projection_lists_ids() {
        let actor = Actor::new("u1").with_outlets(["O1", "O2"]);
        let projection = actor.projection();
        assert_eq!(projection["outlets"], json!(["O1", "O2"]));
        assert_eq!(projection["vendorId"], Value::Null);
    }

    #[test]
    fn test_actor_from_json() {
        let actor: Actor = serde_json::from_value(json!({
            "id": "u1",
            "businessUnits": [{"id": "BU1", "slug": "jkt"}],
            "isSuperAdmin": false
        }))
        .unwrap();
        assert!(actor.is_member(ContextField::BusinessUnit, "jkt"));
        assert!(actor.roles.is_empty());
    }
}
