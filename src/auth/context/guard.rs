//! Context Scope Guard

use super::filter::{FieldConstraint, QueryFilter};
use super::types::{ContextField, TargetContext};
use crate::auth::Actor;
use crate::config::{CollectionConfig, ContextConfig};
use crate::utils::error::{CoreError, Result};
use crate::utils::json::as_key;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Derives the mandatory read filter and checks write payloads against the
/// actor's memberships
#[derive(Debug, Clone)]
pub struct ContextScopeGuard {
    config: Arc<ContextConfig>,
    super_admin_roles: Arc<Vec<String>>,
}

impl ContextScopeGuard {
    pub fn new(config: Arc<ContextConfig>) -> Self {
        Self {
            config,
            super_admin_roles: Arc::new(Vec::new()),
        }
    }

    /// Role names that lift every restriction, alongside `Actor::is_super_admin`
    pub fn with_super_admin_roles(mut self, roles: Vec<String>) -> Self {
        self.super_admin_roles = Arc::new(roles);
        self
    }

    fn bypasses(&self, actor: &Actor) -> bool {
        actor.is_super_admin || actor.has_role_named(&self.super_admin_roles)
    }

    pub fn collection(&self, kind: &str) -> Result<&CollectionConfig> {
        self.config
            .collections
            .get(kind)
            .ok_or_else(|| CoreError::Config(format!("collection '{}' is not registered for context isolation", kind)))
    }

    fn denied(field: ContextField, key: &str) -> CoreError {
        CoreError::context_violation(format!(
            "you do not have access to {} {}",
            field.label(),
            key
        ))
    }

    /// Filter for reads of `kind`.
    ///
    /// A named target is checked for membership and constrains to exactly that
    /// context. Without a target the filter is the union of the actor's
    /// memberships at the collection's primary field.
    pub fn derive_filter(
        &self,
        actor: &Actor,
        kind: &str,
        target: &TargetContext,
    ) -> Result<QueryFilter> {
        if self.bypasses(actor) {
            return Ok(QueryFilter::unrestricted());
        }

        let collection = self.collection(kind)?;
        let mut filter = QueryFilter::restricted();

        for field in ContextField::ALL {
            let Some(key) = target.get(field) else {
                continue;
            };
            let membership = actor.membership(field, key).ok_or_else(|| {
                warn!("Actor {} targeted {} {} without membership", actor.id, field, key);
                Self::denied(field, key)
            })?;
            if collection.has(field) {
                filter.constrain(
                    field,
                    collection.column(field),
                    FieldConstraint::Eq(membership.id.clone()),
                );
            }
        }

        if filter.constraint(ContextField::Company).is_some()
            || filter.constraint(ContextField::BusinessUnit).is_some()
            || filter.constraint(ContextField::Outlet).is_some()
        {
            return Ok(filter);
        }

        let Some(primary) = collection.primary_field() else {
            debug!("Collection {} has no context fields, leaving reads unscoped", kind);
            return Ok(QueryFilter::unrestricted());
        };

        let ids: Vec<String> = actor
            .memberships(primary)
            .iter()
            .map(|m| m.id.clone())
            .collect();
        if ids.is_empty() {
            debug!("Actor {} has no {} memberships, filter matches nothing", actor.id, primary);
        }
        filter.constrain(primary, collection.column(primary), FieldConstraint::from_ids(ids));
        Ok(filter)
    }

    /// Reject a create/update payload naming a context outside the actor's
    /// memberships. Accepts a plain id, an array of ids, or an object with `id`.
    pub fn authorize_write(&self, actor: &Actor, kind: &str, payload: &Value) -> Result<()> {
        if self.bypasses(actor) {
            return Ok(());
        }

        let collection = self.collection(kind)?;

        for field in ContextField::ALL.into_iter().filter(|f| collection.has(*f)) {
            let Some(value) = payload.get(field.document_key()) else {
                continue;
            };

            let keys: Vec<String> = match value {
                Value::Null => continue,
                Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        as_key(item).ok_or_else(|| {
                            CoreError::context_violation(format!("malformed {} reference", field.label()))
                        })
                    })
                    .collect::<Result<_>>()?,
                other => vec![as_key(other).ok_or_else(|| {
                    CoreError::context_violation(format!("malformed {} reference", field.label()))
                })?],
            };

            if let Some(key) = keys.iter().find(|k| !actor.is_member(field, k)) {
                warn!("Actor {} attempted to write {} {} outside scope", actor.id, field, key);
                return Err(Self::denied(field, key));
            }
        }

        Ok(())
    }
}
