//! Tenant record and request hint types

use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::hostname::normalize_host;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentType {
    #[default]
    Shared,
    Dedicated,
}

impl DeploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentType::Shared => "shared",
            DeploymentType::Dedicated => "dedicated",
        }
    }

    /// Unknown values route as shared
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("dedicated") {
            DeploymentType::Dedicated
        } else {
            DeploymentType::Shared
        }
    }
}

impl fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_active() -> bool {
    true
}

/// An organization as seen by request routing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRecord {
    pub organization_id: String,
    pub organization_slug: String,
    #[serde(default)]
    pub deployment_type: DeploymentType,
    #[serde(default)]
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub database_uri: Option<String>,
    #[serde(default)]
    pub storage_config: Option<Value>,
    #[serde(default)]
    pub is_provisioned: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl TenantRecord {
    pub fn new(organization_id: impl Into<String>, organization_slug: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            organization_slug: organization_slug.into(),
            deployment_type: DeploymentType::Shared,
            custom_domain: None,
            database_uri: None,
            storage_config: None,
            is_provisioned: false,
            is_active: true,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.custom_domain = Some(domain.into());
        self
    }

    /// Mark as a provisioned dedicated deployment backed by `database_uri`
    pub fn dedicated(mut self, database_uri: impl Into<String>) -> Self {
        self.deployment_type = DeploymentType::Dedicated;
        self.database_uri = Some(database_uri.into());
        self.is_provisioned = true;
        self
    }

    /// The dedicated database URI, only when the record may actually route there
    pub fn dedicated_uri(&self) -> Option<&str> {
        if self.deployment_type != DeploymentType::Dedicated || !self.is_provisioned {
            return None;
        }
        self.database_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
    }

    pub fn routes_dedicated(&self) -> bool {
        self.dedicated_uri().is_some()
    }

    /// Every key this record can be reached by
    pub fn cache_keys(&self) -> Vec<TenantKey> {
        let mut keys = vec![
            TenantKey::Id(self.organization_id.clone()),
            TenantKey::Slug(self.organization_slug.to_ascii_lowercase()),
        ];
        if let Some(domain) = self.custom_domain.as_deref().and_then(normalize_host) {
            keys.push(TenantKey::Domain(domain));
        }
        keys
    }
}

/// A single lookup key into the tenant store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TenantKey {
    Domain(String),
    Slug(String),
    Id(String),
}

impl TenantKey {
    /// Key under the `tenant` cache namespace
    pub fn cache_key(&self) -> String {
        match self {
            TenantKey::Domain(domain) => format!("domain:{}", domain),
            TenantKey::Slug(slug) => format!("slug:{}", slug),
            TenantKey::Id(id) => format!("id:{}", id),
        }
    }
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

/// Identifiers an inbound request carries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHints {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub tenant_slug: Option<String>,
}

impl RequestHints {
    pub fn host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Default::default()
        }
    }

    pub fn tenant_id(id: impl Into<String>) -> Self {
        Self {
            tenant_id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn tenant_slug(slug: impl Into<String>) -> Self {
        Self {
            tenant_slug: Some(slug.into()),
            ..Default::default()
        }
    }

    /// Read `host`, `x-organization-id` and `x-organization-slug`
    /// (case-insensitive names). Hosts are lower-cased and stripped of ports.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut hints = Self::default();
        for (name, value) in headers {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match name.to_ascii_lowercase().as_str() {
                "host" => hints.host = normalize_host(value),
                "x-organization-id" => hints.tenant_id = Some(value.to_string()),
                "x-organization-slug" => hints.tenant_slug = Some(value.to_ascii_lowercase()),
                _ => {}
            }
        }
        hints
    }
}

/// Authoritative tenant lookups
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Exact match on the normalized custom domain
    async fn find_by_domain(&self, domain: &str) -> Result<Option<TenantRecord>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<TenantRecord>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<TenantRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedicated_requires_uri_and_provisioning() {
        let mut tenant = TenantRecord::new("org1", "acme").dedicated("sqlite::memory:");
        assert!(tenant.routes_dedicated());

        tenant.is_provisioned = false;
        assert!(!tenant.routes_dedicated());

        tenant.is_provisioned = true;
        tenant.database_uri = Some("  ".to_string());
        assert!(!tenant.routes_dedicated());
    }

    #[test]
    fn test_cache_keys_cover_every_identifier() {
        let tenant = TenantRecord::new("org1", "Acme").with_domain("Shop.Acme.com");
        let keys: Vec<String> = tenant.cache_keys().iter().map(TenantKey::cache_key).collect();
        assert_eq!(keys, vec!["id:org1", "slug:acme", "domain:shop.acme.com"]);
    }

    #[test]
    fn test_hints_from_headers() {
        let hints = RequestHints::from_headers([
            ("Host", "Acme.Platform.io:8443"),
            ("X-Organization-Slug", "ACME"),
            ("x-organization-id", ""),
        ]);
        assert_eq!(hints.host.as_deref(), Some("acme.platform.io"));
        assert_eq!(hints.tenant_slug.as_deref(), Some("acme"));
        assert!(hints.tenant_id.is_none());
    }

    #[test]
    fn test_record_deserializes_with_defaults() {
        let tenant: TenantRecord = serde_json::from_value(serde_json::json!({
            "organizationId": "org1",
            "organizationSlug": "acme",
            "deploymentType": "dedicated"
        }))
        .unwrap();
        assert_eq!(tenant.deployment_type, DeploymentType::Dedicated);
        assert!(tenant.is_active);
        assert!(!tenant.routes_dedicated());
    }
}
