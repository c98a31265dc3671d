use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One settings document per (level, owner)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "settings_documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// `outlet`, `business_unit`, `organization`, `platform` or `system`
    pub level: String,

    /// Owner id, `_` for platform and system
    pub owner_id: String,

    /// Sparse settings tree
    pub document: Json,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
