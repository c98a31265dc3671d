//! Settings levels and request context

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Owner key used for the process-wide Platform and System documents
pub const SINGLETON_OWNER: &str = "_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsLevel {
    Outlet,
    BusinessUnit,
    Organization,
    Platform,
    System,
}

impl SettingsLevel {
    /// Most specific first
    pub const CASCADE: [SettingsLevel; 5] = [
        SettingsLevel::Outlet,
        SettingsLevel::BusinessUnit,
        SettingsLevel::Organization,
        SettingsLevel::Platform,
        SettingsLevel::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsLevel::Outlet => "outlet",
            SettingsLevel::BusinessUnit => "business_unit",
            SettingsLevel::Organization => "organization",
            SettingsLevel::Platform => "platform",
            SettingsLevel::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::CASCADE.into_iter().find(|level| level.as_str() == value)
    }

    /// Platform and System have one document per process, created on first access
    pub fn is_singleton(&self) -> bool {
        matches!(self, SettingsLevel::Platform | SettingsLevel::System)
    }
}

impl fmt::Display for SettingsLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a request sits in the hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsContext {
    #[serde(default)]
    pub outlet_id: Option<String>,
    #[serde(default)]
    pub business_unit_id: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
}

impl SettingsContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outlet(mut self, id: impl Into<String>) -> Self {
        self.outlet_id = Some(id.into());
        self
    }

    pub fn business_unit(mut self, id: impl Into<String>) -> Self {
        self.business_unit_id = Some(id.into());
        self
    }

    pub fn organization(mut self, id: impl Into<String>) -> Self {
        self.organization_id = Some(id.into());
        self
    }
}

/// A resolved value and the level it came from. `source` is `None` when the
/// default was used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSetting {
    pub value: Value,
    pub source: Option<SettingsLevel>,
}

impl ResolvedSetting {
    pub fn is_default(&self) -> bool {
        self.source.is_none()
    }
}
