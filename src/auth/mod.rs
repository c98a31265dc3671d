//! Authorization for multi-tenant requests
//!
//! - `rbac` decides whether an actor may perform an action on a resource.
//! - `context` confines reads and writes to the actor's company, business unit
//!   and outlet memberships.

pub mod context;
pub mod rbac;
mod types;

pub use types::{Actor, ContextRef, ResourceAttributes};

use crate::utils::error::{CoreError, Result};

/// Require an authenticated actor. Missing identity is always fatal.
pub fn require_actor(actor: Option<&Actor>) -> Result<&Actor> {
    actor.ok_or_else(|| CoreError::unauthenticated("No actor context on request"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_actor() {
        let actor = Actor::new("u1");
        assert_eq!(require_actor(Some(&actor)).unwrap().id, "u1");

        let err = require_actor(None).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }
}
