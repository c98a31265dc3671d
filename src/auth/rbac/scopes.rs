//! Scope matching
//!
//! Every scope other than `global` needs a concrete context value to compare
//! against. When that value is absent the scope does not match.

use super::types::{PermissionContext, ScopeKind};
use crate::auth::Actor;
use crate::auth::context::ContextField;

pub fn scope_matches(scope: ScopeKind, actor: &Actor, context: &PermissionContext) -> bool {
    let scope_ctx = context.scope_ref();
    let resource = context.resource_ref();

    match scope {
        ScopeKind::Global => true,
        ScopeKind::Company => scope_ctx
            .and_then(|s| s.company_id.as_deref())
            .is_some_and(|id| actor.is_member(ContextField::Company, id)),
        ScopeKind::Business => scope_ctx
            .and_then(|s| s.business_unit_id.as_deref())
            .is_some_and(|id| actor.is_member(ContextField::BusinessUnit, id)),
        ScopeKind::Outlet => scope_ctx
            .and_then(|s| s.outlet_id.as_deref())
            .is_some_and(|id| actor.is_member(ContextField::Outlet, id)),
        ScopeKind::Branch => scope_ctx
            .and_then(|s| s.branch_id.as_deref())
            .or_else(|| resource.and_then(|r| r.branch_id.as_deref()))
            .is_some_and(|id| actor.branches.iter().any(|b| b == id)),
        ScopeKind::Department => scope_ctx
            .and_then(|s| s.department_id.as_deref())
            .or_else(|| resource.and_then(|r| r.department_id.as_deref()))
            .is_some_and(|id| actor.departments.iter().any(|d| d == id)),
        ScopeKind::Vendor => {
            match (
                actor.vendor_id.as_deref(),
                resource.and_then(|r| r.vendor_id.as_deref()),
            ) {
                (Some(mine), Some(theirs)) => mine == theirs,
                _ => false,
            }
        }
        ScopeKind::Region => {
            match (
                actor.region.as_deref(),
                resource.and_then(|r| r.region.as_deref()),
            ) {
                (Some(mine), Some(theirs)) => mine == theirs,
                _ => false,
            }
        }
        ScopeKind::SelfOwned => resource
            .and_then(|r| r.owner_id.as_deref())
            .is_some_and(|owner| owner == actor.id),
    }
}
