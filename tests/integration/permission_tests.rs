//! Permission evaluation through the wired access core

#[cfg(test)]
mod tests {
    use crate::common::assertions::assert_forbidden;
    use crate::common::{ActorFactory, TestCore};
    use tenant_access::CoreError;
    use tenant_access::auth::Actor;
    use tenant_access::auth::rbac::{
        DiagnosticKind, Permission, PermissionContext, PermissionGroup, PermissionResolver,
        ResolutionStrategy, ResolvedBy, Role,
    };
    use tenant_access::core::cache::EntityType;

    #[tokio::test]
    async fn test_default_deny() {
        let test = TestCore::new().await;
        let decision = test
            .core
            .evaluator()
            .evaluate(&ActorFactory::cashier(), "product", "delete", &PermissionContext::new())
            .await
            .unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.resolved_by, ResolvedBy::DefaultDeny);
    }

    #[tokio::test]
    async fn test_unknown_resource_is_denied() {
        let test = TestCore::new().await;
        let actor = Actor::new("u1").with_permission(Permission::new("p", "product", "read"));
        let decision = test
            .core
            .evaluator()
            .evaluate(&actor, "spaceship", "read", &PermissionContext::new())
            .await
            .unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.resolved_by, ResolvedBy::Catalog);
    }

    #[tokio::test]
    async fn test_cumulative_group_deny_wins() {
        let test = TestCore::new().await;
        let group = PermissionGroup::new("pricing", "Pricing")
            .with_resolver(PermissionResolver::new(ResolutionStrategy::Cumulative))
            .with_permission(Permission::new("price-allow", "product", "update"))
            .with_permission(Permission::new("price-deny", "product", "update").deny());
        let actor = Actor::new("u1").with_role(Role::new("r1", "Pricing Clerk").with_group(group));

        assert_forbidden(
            test.core
                .evaluator()
                .authorize(&actor, "product", "update", &PermissionContext::new())
                .await,
        );
    }

    #[tokio::test]
    async fn test_inherited_role_follows_registry_updates() {
        let test = TestCore::new().await;
        test.core
            .roles()
            .upsert_role(
                Role::new("catalog-reader", "Catalog Reader")
                    .with_permission(Permission::new("read", "product", "read")),
            )
            .await
            .unwrap();
        let actor = Actor::new("u1").with_role(Role::new("clerk", "Clerk").inherits("catalog-reader"));
        let ctx = PermissionContext::new();

        let decision = test
            .core
            .evaluator()
            .evaluate(&actor, "product", "read", &ctx)
            .await
            .unwrap();
        assert!(decision.allowed);

        // Writing the role bumps its version, so the cached set is not reused
        test.core
            .roles()
            .upsert_role(Role::new("catalog-reader", "Catalog Reader"))
            .await
            .unwrap();
        let decision = test
            .core
            .evaluator()
            .evaluate(&actor, "product", "read", &ctx)
            .await
            .unwrap();
        assert!(!decision.allowed);
    }

    #[tokio::test]
    async fn test_registry_rejects_inheritance_cycle() {
        let test = TestCore::new().await;
        let roles = test.core.roles();
        roles
            .upsert_role(Role::new("a", "A").inherits("b"))
            .await
            .unwrap();

        let err = roles
            .upsert_role(Role::new("b", "B").inherits("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidPermissionConfig(_)));
        assert!(roles.get_role("b").is_none());
    }

    #[tokio::test]
    async fn test_cycle_on_actor_roles_fails_closed() {
        let test = TestCore::new().await;
        test.core
            .roles()
            .upsert_role(Role::new("r2", "R2").with_permission(Permission::new("p", "order", "read")))
            .await
            .unwrap();
        test.core
            .roles()
            .upsert_role(Role::new("r1", "R1").inherits("r2"))
            .await
            .unwrap();

        let r2 = Role::new("r2", "R2")
            .with_permission(Permission::new("p", "order", "read"))
            .inherits("r1");
        let actor = Actor::new("u1")
            .with_role(r2)
            .with_role(Role::new("r1", "R1").inherits("r2"));

        let decision = test
            .core
            .evaluator()
            .evaluate(&actor, "order", "read", &PermissionContext::new())
            .await
            .unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.diagnostics[0].kind, DiagnosticKind::InheritanceCycle);
    }

    #[tokio::test]
    async fn test_super_admin_role_short_circuits() {
        let test = TestCore::new().await;
        let actor = Actor::new("root").with_role(Role::new("r-sa", "super_admin"));
        let decision = test
            .core
            .evaluator()
            .authorize(&actor, "auditLog", "export", &PermissionContext::new())
            .await
            .unwrap();
        assert!(decision.allowed);
    }

    #[tokio::test]
    async fn test_version_bump_is_monotonic() {
        let test = TestCore::new().await;
        let first = test.core.bump_version(EntityType::Permission).await;
        let second = test.core.bump_version(EntityType::Permission).await;
        assert!(second > first);
    }
}
