//! Role-Based Access Control (RBAC) system
//!
//! Roles, permission groups and direct grants are flattened into an effective
//! permission set, filtered by conditions and scope, and the survivors are
//! reconciled by a resolution strategy. No match means deny.

mod catalog;
mod conditions;
mod graph;
mod registry;
mod resolution;
mod scopes;
mod system;
mod types;

// Re-export public types and structs
pub use catalog::PermissionCatalog;
pub use conditions::{evaluate_condition, validate_condition};
pub use graph::{EffectivePermission, EffectiveSet, RoleSource, collect_effective};
pub use registry::RoleRegistry;
pub use scopes::scope_matches;
pub use system::PermissionEvaluator;
pub use types::{
    Condition, ConditionOperator, Decision, Diagnostic, DiagnosticKind, Effect,
    EnvironmentContext, GrantSource, Permission, PermissionContext, PermissionGroup,
    PermissionResolver, ResolutionStrategy, ResolvedBy, Role, ScopeContext, ScopeKind,
};
