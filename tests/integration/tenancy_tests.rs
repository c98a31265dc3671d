//! Tenant resolution and connection routing over the SeaORM tenant store

#[cfg(test)]
mod tests {
    use crate::common::{TenantFactory, TestCore};
    use sea_orm::ConnectionTrait;
    use std::sync::Arc;
    use tenant_access::CoreError;
    use tenant_access::tenancy::{RequestHints, RouteKind};

    #[tokio::test]
    async fn test_resolve_by_domain_slug_and_id() {
        let test = TestCore::seeded().await;
        let resolver = test.core.tenant_resolver();

        for hints in [
            RequestHints::host("shop.acme.com"),
            RequestHints::host("acme.platform.io"),
            RequestHints::tenant_slug("acme"),
            RequestHints::tenant_id(TenantFactory::ACME_ID),
        ] {
            let tenant = resolver.require(&hints).await.unwrap();
            assert_eq!(tenant.organization_id, TenantFactory::ACME_ID, "hints {:?}", hints);
        }
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_tenants_are_not_found() {
        let test = TestCore::seeded().await;
        let resolver = test.core.tenant_resolver();

        assert!(resolver
            .resolve(&RequestHints::host("nobody.example.org"))
            .await
            .unwrap()
            .is_none());

        let err = resolver
            .require(&RequestHints::tenant_slug("hooli"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::TenantNotFound(_)));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_unknown_tenant_routes_to_shared() {
        let test = TestCore::seeded().await;
        let route = test
            .core
            .tenancy()
            .resolve_connection(&RequestHints::host("www.platform.io"))
            .await
            .unwrap();
        assert!(route.tenant.is_none());
        assert_eq!(route.route.kind, RouteKind::Shared);
    }

    #[tokio::test]
    async fn test_unprovisioned_dedicated_tenant_uses_shared() {
        let test = TestCore::seeded().await;
        let route = test
            .core
            .tenancy()
            .resolve_connection(&RequestHints::tenant_slug("globex"))
            .await
            .unwrap();
        assert_eq!(route.tenant.unwrap().organization_slug, "globex");
        assert_eq!(route.route.kind, RouteKind::Shared);
        assert!(!test.core.router().has_dedicated("org-globex"));
    }

    #[tokio::test]
    async fn test_dedicated_connection_reused_then_evicted_on_deactivation() {
        let test = TestCore::seeded().await;
        let tenancy = test.core.tenancy();
        let hints = RequestHints::tenant_slug("initech");

        let first = tenancy.resolve_connection(&hints).await.unwrap();
        assert_eq!(first.route.kind, RouteKind::Dedicated);
        let second = tenancy.resolve_connection(&hints).await.unwrap();
        assert!(Arc::ptr_eq(&first.route.connection, &second.route.connection));
        assert_eq!(test.core.router().dedicated_count(), 1);
        drop(first);
        drop(second);

        let old = TenantFactory::initech();
        let mut new = old.clone();
        new.is_active = false;
        test.core.database().tenant_store().save(&new).await.unwrap();
        tenancy.on_tenant_updated(&old, &new).await;

        assert!(!test.core.router().has_dedicated("org-initech"));
        let route = tenancy.resolve_connection(&hints).await.unwrap();
        assert!(route.tenant.is_none());
        assert_eq!(route.route.kind, RouteKind::Shared);
    }

    #[tokio::test]
    async fn test_domain_change_requires_invalidation() {
        let test = TestCore::seeded().await;
        let resolver = test.core.tenant_resolver();
        let old_host = RequestHints::host("shop.acme.com");
        let new_host = RequestHints::host("store.acme.com");

        // Warm every cache key for the tenant
        resolver.require(&old_host).await.unwrap();

        let old = TenantFactory::acme();
        let new = old.clone().with_domain("store.acme.com");
        test.core.database().tenant_store().save(&new).await.unwrap();

        // The cached record still answers for the old domain
        assert!(resolver.resolve(&old_host).await.unwrap().is_some());

        test.core.tenancy().on_tenant_updated(&old, &new).await;
        assert!(resolver.resolve(&old_host).await.unwrap().is_none());
        let tenant = resolver.require(&new_host).await.unwrap();
        assert_eq!(tenant.custom_domain.as_deref(), Some("store.acme.com"));
    }

    #[tokio::test]
    async fn test_deleted_tenant_is_gone() {
        let test = TestCore::seeded().await;
        let hints = RequestHints::tenant_id(TenantFactory::ACME_ID);
        let acme = test.core.tenant_resolver().require(&hints).await.unwrap();

        // Outlets reference the organization
        let connection = test.core.database().connection();
        connection.execute_unprepared("DELETE FROM outlets").await.unwrap();
        test.core
            .database()
            .tenant_store()
            .delete(TenantFactory::ACME_ID)
            .await
            .unwrap();
        test.core.invalidate_tenant(&acme).await;

        assert!(test.core.tenant_resolver().resolve(&hints).await.unwrap().is_none());
    }
}
