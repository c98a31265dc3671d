use crate::settings::{SINGLETON_OWNER, SettingsLevel, SettingsStore};
use crate::utils::error::{CoreError, Result};
use async_trait::async_trait;
use sea_orm::*;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use super::super::entities::{self, outlet, settings_document};

/// Settings documents and outlet parent lookups
#[derive(Debug, Clone)]
pub struct SeaOrmSettingsStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSettingsStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find(&self, level: SettingsLevel, owner_id: &str) -> Result<Option<settings_document::Model>> {
        entities::SettingsDocument::find()
            .filter(settings_document::Column::Level.eq(level.as_str()))
            .filter(settings_document::Column::OwnerId.eq(owner_id))
            .one(&*self.db)
            .await
            .map_err(CoreError::Database)
    }

    /// Insert or update an outlet row
    pub async fn save_outlet(&self, model: outlet::Model) -> Result<()> {
        let existing = entities::Outlet::find_by_id(model.id.clone())
            .one(&*self.db)
            .await
            .map_err(CoreError::Database)?;

        let active: outlet::ActiveModel = model.into();
        let active = active.reset_all();
        if existing.is_some() {
            active.update(&*self.db).await.map_err(CoreError::Database)?;
        } else {
            active.insert(&*self.db).await.map_err(CoreError::Database)?;
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for SeaOrmSettingsStore {
    async fn load_document(&self, level: SettingsLevel, owner_id: &str) -> Result<Option<Value>> {
        debug!("Loading {} settings for {}", level, owner_id);
        Ok(self.find(level, owner_id).await?.map(|m| m.document))
    }

    async fn load_singleton(&self, level: SettingsLevel) -> Result<Value> {
        if let Some(model) = self.find(level, SINGLETON_OWNER).await? {
            return Ok(model.document);
        }

        let model = settings_document::ActiveModel {
            level: Set(level.as_str().to_string()),
            owner_id: Set(SINGLETON_OWNER.to_string()),
            document: Set(json!({})),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        // A concurrent creator may win the unique index; the re-read below covers it
        if let Err(e) = model.insert(&*self.db).await {
            debug!("{} settings already created concurrently: {}", level, e);
        }

        self.find(level, SINGLETON_OWNER)
            .await?
            .map(|m| m.document)
            .ok_or_else(|| CoreError::internal(format!("failed to create {} settings", level)))
    }

    async fn outlet_business_unit(&self, outlet_id: &str) -> Result<Option<String>> {
        let outlet = entities::Outlet::find_by_id(outlet_id.to_string())
            .one(&*self.db)
            .await
            .map_err(CoreError::Database)?;
        Ok(outlet.and_then(|o| o.business_unit))
    }

    async fn save_document(&self, level: SettingsLevel, owner_id: &str, document: Value) -> Result<()> {
        debug!("Saving {} settings for {}", level, owner_id);

        match self.find(level, owner_id).await? {
            Some(existing) => {
                let mut model: settings_document::ActiveModel = existing.into();
                model.document = Set(document);
                model.updated_at = Set(chrono::Utc::now().into());
                model.update(&*self.db).await.map_err(CoreError::Database)?;
            }
            None => {
                let model = settings_document::ActiveModel {
                    level: Set(level.as_str().to_string()),
                    owner_id: Set(owner_id.to_string()),
                    document: Set(document),
                    updated_at: Set(chrono::Utc::now().into()),
                    ..Default::default()
                };
                model.insert(&*self.db).await.map_err(CoreError::Database)?;
            }
        }
        Ok(())
    }
}
