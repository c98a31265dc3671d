use crate::tenancy::{DeploymentType, TenantRecord};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};

/// Organization (tenant) database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Lower-case slug (unique)
    #[sea_orm(unique)]
    pub slug: String,

    /// `shared` or `dedicated`
    pub deployment_type: String,

    /// Normalized custom domain (unique)
    #[sea_orm(unique)]
    pub custom_domain: Option<String>,

    pub database_uri: Option<String>,

    pub storage_config: Option<Json>,

    pub is_provisioned: bool,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::outlet::Entity")]
    Outlets,
}

impl Related<super::outlet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Outlets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_tenant_record(&self) -> TenantRecord {
        TenantRecord {
            organization_id: self.id.clone(),
            organization_slug: self.slug.clone(),
            deployment_type: DeploymentType::parse(&self.deployment_type),
            custom_domain: self.custom_domain.clone(),
            database_uri: self.database_uri.clone(),
            storage_config: self.storage_config.clone(),
            is_provisioned: self.is_provisioned,
            is_active: self.is_active,
        }
    }
}

impl ActiveModel {
    /// Active model carrying every tenant field. Timestamps are left to the caller.
    pub fn from_tenant_record(record: &TenantRecord) -> Self {
        Self {
            id: Set(record.organization_id.clone()),
            slug: Set(record.organization_slug.to_ascii_lowercase()),
            deployment_type: Set(record.deployment_type.as_str().to_string()),
            custom_domain: Set(record
                .custom_domain
                .as_deref()
                .and_then(crate::tenancy::hostname::normalize_host)),
            database_uri: Set(record.database_uri.clone()),
            storage_config: Set(record.storage_config.clone()),
            is_provisioned: Set(record.is_provisioned),
            is_active: Set(record.is_active),
            created_at: NotSet,
            updated_at: NotSet,
        }
    }
}
