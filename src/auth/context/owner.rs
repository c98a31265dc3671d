//! Resource Owner Guard
//!
//! Single-record fetch, update and delete load only the record's context
//! column and compare it with the actor's memberships before the request
//! proceeds.

use crate::auth::Actor;
use crate::config::ContextConfig;
use crate::utils::error::{CoreError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Context value stored on a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordContext {
    NotFound,
    /// The record carries no context value
    Unscoped,
    Scoped(String),
}

/// Loads a single context column for one record
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContextFieldLoader: Send + Sync {
    async fn load_context(&self, table: &str, column: &str, record_id: &str)
    -> Result<RecordContext>;
}

#[derive(Clone)]
pub struct ResourceOwnerGuard {
    config: Arc<ContextConfig>,
    loader: Arc<dyn ContextFieldLoader>,
    super_admin_roles: Arc<Vec<String>>,
}

impl ResourceOwnerGuard {
    pub fn new(config: Arc<ContextConfig>, loader: Arc<dyn ContextFieldLoader>) -> Self {
        Self {
            config,
            loader,
            super_admin_roles: Arc::new(Vec::new()),
        }
    }

    pub fn with_super_admin_roles(mut self, roles: Vec<String>) -> Self {
        self.super_admin_roles = Arc::new(roles);
        self
    }

    /// Allow the request to touch `record_id` of `kind`, or explain why not.
    ///
    /// Records without a context value pass only when the collection sets
    /// `allow_unscoped`.
    pub async fn check(&self, actor: &Actor, kind: &str, record_id: &str) -> Result<()> {
        if actor.is_super_admin || actor.has_role_named(&self.super_admin_roles) {
            return Ok(());
        }

        let collection = self.config.collections.get(kind).ok_or_else(|| {
            CoreError::Config(format!(
                "collection '{}' is not registered for context isolation",
                kind
            ))
        })?;

        let Some(field) = collection.primary_field() else {
            return Ok(());
        };

        let table = collection.table.as_deref().unwrap_or(kind);
        let column = collection.column(field);

        match self.loader.load_context(table, &column, record_id).await? {
            RecordContext::NotFound => Err(CoreError::not_found(format!("{} {}", kind, record_id))),
            RecordContext::Unscoped if collection.allow_unscoped => {
                debug!("{} {} has no {} value, treating as global", kind, record_id, field);
                Ok(())
            }
            RecordContext::Unscoped => Err(CoreError::context_violation(format!(
                "{} {} is not assigned to any {}",
                kind,
                record_id,
                field.label()
            ))),
            RecordContext::Scoped(value) if actor.is_member(field, &value) => Ok(()),
            RecordContext::Scoped(value) => {
                warn!(
                    "Actor {} denied {} {} belonging to {} {}",
                    actor.id, kind, record_id, field, value
                );
                Err(CoreError::context_violation(format!(
                    "you do not have access to {} {}",
                    field.label(),
                    value
                )))
            }
        }
    }
}
