use crate::auth::context::{ContextFieldLoader, RecordContext};
use crate::utils::error::{CoreError, Result};
use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Expr, Query};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::sync::Arc;
use tracing::debug;

/// Loads one context column of one record by `id`
#[derive(Debug, Clone)]
pub struct SeaOrmContextLoader {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmContextLoader {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContextFieldLoader for SeaOrmContextLoader {
    async fn load_context(&self, table: &str, column: &str, record_id: &str) -> Result<RecordContext> {
        let query = Query::select()
            .column(Alias::new(column))
            .from(Alias::new(table))
            .and_where(Expr::col(Alias::new("id")).eq(record_id))
            .limit(1)
            .to_owned();

        let backend = self.db.get_database_backend();
        let row = self
            .db
            .query_one(backend.build(&query))
            .await
            .map_err(CoreError::Database)?;

        let Some(row) = row else {
            debug!("{} {} not found", table, record_id);
            return Ok(RecordContext::NotFound);
        };

        let value: Option<String> = row.try_get("", column).map_err(CoreError::Database)?;
        Ok(match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(value) => RecordContext::Scoped(value),
            None => RecordContext::Unscoped,
        })
    }
}
