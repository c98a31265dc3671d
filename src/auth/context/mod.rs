//! Context isolation
//!
//! Reads are narrowed to the actor's company, business unit and outlet
//! memberships; writes and single-record access are rejected outside them.

pub mod assignment;
pub mod filter;
pub mod guard;
pub mod owner;
pub mod types;

pub use assignment::{
    AssignmentRegistry, AssignmentScope, AssignmentStatus, Memberships, ScopeAssignment,
};
pub use filter::{FieldConstraint, QueryFilter};
pub use guard::ContextScopeGuard;
pub use owner::{ContextFieldLoader, RecordContext, ResourceOwnerGuard};
pub use types::{ContextField, TargetContext};
