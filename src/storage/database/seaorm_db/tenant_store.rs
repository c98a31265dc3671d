use crate::tenancy::{TenantRecord, TenantStore};
use crate::utils::error::{CoreError, Result};
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use tracing::debug;

use super::super::entities::{self, organization};

/// Tenant lookups and writes over the `organizations` table
#[derive(Debug, Clone)]
pub struct SeaOrmTenantStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTenantStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find_one(&self, filter: Condition) -> Result<Option<TenantRecord>> {
        let model = entities::Organization::find()
            .filter(filter)
            .one(&*self.db)
            .await
            .map_err(CoreError::Database)?;
        Ok(model.map(|m| m.to_tenant_record()))
    }

    /// Insert or update an organization
    pub async fn save(&self, record: &TenantRecord) -> Result<()> {
        debug!("Saving organization: {}", record.organization_id);

        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        let mut model = organization::ActiveModel::from_tenant_record(record);
        model.updated_at = Set(now);

        let existing = entities::Organization::find_by_id(record.organization_id.clone())
            .one(&*self.db)
            .await
            .map_err(CoreError::Database)?;

        if existing.is_some() {
            model.update(&*self.db).await.map_err(CoreError::Database)?;
        } else {
            model.created_at = Set(now);
            model.insert(&*self.db).await.map_err(CoreError::Database)?;
        }
        Ok(())
    }

    pub async fn delete(&self, organization_id: &str) -> Result<()> {
        let result = entities::Organization::delete_by_id(organization_id.to_string())
            .exec(&*self.db)
            .await
            .map_err(CoreError::Database)?;
        if result.rows_affected == 0 {
            return Err(CoreError::not_found(format!("organization {}", organization_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl TenantStore for SeaOrmTenantStore {
    async fn find_by_domain(&self, domain: &str) -> Result<Option<TenantRecord>> {
        debug!("Finding organization by domain: {}", domain);
        self.find_one(Condition::all().add(organization::Column::CustomDomain.eq(domain)))
            .await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<TenantRecord>> {
        debug!("Finding organization by slug: {}", slug);
        self.find_one(Condition::all().add(organization::Column::Slug.eq(slug)))
            .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TenantRecord>> {
        debug!("Finding organization by ID: {}", id);
        self.find_one(Condition::all().add(organization::Column::Id.eq(id)))
            .await
    }
}
