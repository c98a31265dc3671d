//! Settings document persistence

use super::types::SettingsLevel;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Authoritative storage for settings documents.
///
/// Documents are sparse JSON trees. Owner ids are outlet, business unit or
/// organization ids; singleton levels use [`SINGLETON_OWNER`](super::types::SINGLETON_OWNER).
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// The owner's document, `None` when it has none
    async fn load_document(&self, level: SettingsLevel, owner_id: &str) -> Result<Option<Value>>;

    /// Get-or-create the Platform or System document
    async fn load_singleton(&self, level: SettingsLevel) -> Result<Value>;

    /// Parent business unit of an outlet
    async fn outlet_business_unit(&self, outlet_id: &str) -> Result<Option<String>>;

    /// Replace the owner's document
    async fn save_document(&self, level: SettingsLevel, owner_id: &str, document: Value) -> Result<()>;
}
