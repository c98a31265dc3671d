//! End-to-end request flow
//!
//! Headers in, tenant connection chosen, memberships loaded, reads filtered,
//! writes authorized and settings resolved.

#[cfg(test)]
mod tests {
    use crate::common::assertions::{assert_context_violation, assert_forbidden};
    use crate::common::{RoleFactory, TestCore};
    use sea_orm::sea_query::{Alias, Order, Query};
    use sea_orm::{ConnectionTrait, DatabaseConnection};
    use serde_json::json;
    use tenant_access::auth::context::{AssignmentScope, ScopeAssignment, TargetContext};
    use tenant_access::auth::rbac::{PermissionContext, ScopeContext};
    use tenant_access::auth::{Actor, require_actor};
    use tenant_access::settings::SettingsContext;
    use tenant_access::tenancy::{RequestHints, RouteKind};

    async fn product_ids(
        connection: &DatabaseConnection,
        condition: sea_orm::sea_query::Condition,
    ) -> Vec<String> {
        let query = Query::select()
            .column(Alias::new("id"))
            .from(Alias::new("products"))
            .cond_where(condition)
            .order_by(Alias::new("id"), Order::Asc)
            .to_owned();
        let backend = connection.get_database_backend();
        connection
            .query_all(backend.build(&query))
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.try_get::<String>("", "id").unwrap())
            .collect()
    }

    fn manager_with_assignment(test: &TestCore) -> Actor {
        test.core
            .assignments()
            .create(
                ScopeAssignment::new("u-manager", "outlet-manager", AssignmentScope::Outlet)
                    .company("C1")
                    .business_unit("BU1")
                    .outlet("O1")
                    .primary(),
            )
            .unwrap();

        let mut actor = Actor::new("u-manager").with_role(RoleFactory::outlet_manager());
        test.core.load_memberships(&mut actor);
        actor
    }

    #[tokio::test]
    async fn test_full_request_flow() {
        let test = TestCore::seeded().await;

        let hints = RequestHints::from_headers([("Host", "Shop.Acme.com:443")]);
        let tenant_route = test.core.tenancy().resolve_connection(&hints).await.unwrap();
        let tenant = tenant_route.tenant.expect("tenant should resolve from host");
        assert_eq!(tenant.organization_slug, "acme");
        assert_eq!(tenant_route.route.kind, RouteKind::Shared);

        let actor = manager_with_assignment(&test);
        let actor = require_actor(Some(&actor)).unwrap();
        assert_eq!(actor.outlets[0].id, "O1");

        let filter = test
            .core
            .scope_guard()
            .derive_filter(actor, "product", &TargetContext::none())
            .unwrap();
        let ids = product_ids(&tenant_route.route.connection, filter.to_condition()).await;
        assert_eq!(ids, vec!["p1", "p2"]);

        let in_outlet = PermissionContext::new().with_scope(ScopeContext {
            outlet_id: Some("O1".to_string()),
            ..Default::default()
        });
        test.core
            .evaluator()
            .authorize(actor, "product", "update", &in_outlet)
            .await
            .unwrap();
        test.core
            .owner_guard()
            .check(actor, "product", "p1")
            .await
            .unwrap();

        let settings = SettingsContext::new().outlet("O1");
        let footer = test
            .core
            .settings()
            .resolve_setting("receipt.footer", &settings, json!(""))
            .await
            .unwrap();
        assert_eq!(footer, json!("Thank you"));
    }

    #[tokio::test]
    async fn test_request_outside_memberships_is_rejected() {
        let test = TestCore::seeded().await;
        let actor = manager_with_assignment(&test);

        let other_outlet = PermissionContext::new().with_scope(ScopeContext {
            outlet_id: Some("O3".to_string()),
            ..Default::default()
        });
        assert_forbidden(
            test.core
                .evaluator()
                .authorize(&actor, "product", "update", &other_outlet)
                .await,
        );

        assert_context_violation(
            test.core.owner_guard().check(&actor, "product", "p3").await,
            "BU2",
        );
        assert_context_violation(
            test.core.scope_guard().derive_filter(
                &actor,
                "product",
                &TargetContext::business_unit("BU2"),
            ),
            "Business Unit BU2",
        );
        assert_context_violation(
            test.core.scope_guard().authorize_write(
                &actor,
                "product",
                &json!({"name": "Pie", "businessUnit": "BU2"}),
            ),
            "BU2",
        );
    }

    #[tokio::test]
    async fn test_unscoped_product_passes_owner_guard() {
        let test = TestCore::seeded().await;
        let actor = manager_with_assignment(&test);

        test.core
            .owner_guard()
            .check(&actor, "product", "p4")
            .await
            .unwrap();

        let err = test
            .core
            .owner_guard()
            .check(&actor, "product", "missing")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_revoked_assignment_drops_memberships() {
        let test = TestCore::seeded().await;
        let id = test
            .core
            .assignments()
            .create(
                ScopeAssignment::new("u-temp", "cashier", AssignmentScope::Company).company("C1"),
            )
            .unwrap();

        let mut actor = Actor::new("u-temp");
        test.core.load_memberships(&mut actor);
        assert_eq!(actor.companies.len(), 1);

        test.core.assignments().revoke(id).unwrap();
        test.core.load_memberships(&mut actor);
        assert!(actor.companies.is_empty());

        let filter = test
            .core
            .scope_guard()
            .derive_filter(&actor, "customer", &TargetContext::none())
            .unwrap();
        assert!(!filter.matches(&json!({"company": "C1"})));
    }

    #[tokio::test]
    async fn test_super_admin_bypasses_isolation() {
        let test = TestCore::seeded().await;
        let admin = Actor::new("root").super_admin();

        let filter = test
            .core
            .scope_guard()
            .derive_filter(&admin, "product", &TargetContext::none())
            .unwrap();
        assert!(filter.is_unrestricted());

        let connection = test.core.database().connection();
        let ids = product_ids(&connection, filter.to_condition()).await;
        assert_eq!(ids.len(), 4);

        test.core
            .owner_guard()
            .check(&admin, "product", "p3")
            .await
            .unwrap();
    }
}
