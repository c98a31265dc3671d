//! Settings cascade over the SeaORM settings store

#[cfg(test)]
mod tests {
    use crate::common::{TenantFactory, TestCore};
    use serde_json::json;
    use tenant_access::settings::{SettingsContext, SettingsLevel, SettingsStore};

    fn outlet(id: &str) -> SettingsContext {
        SettingsContext::new()
            .outlet(id)
            .organization(TenantFactory::ACME_ID)
    }

    #[tokio::test]
    async fn test_nearest_level_wins() {
        let test = TestCore::seeded().await;
        let settings = test.core.settings();

        let o1 = settings
            .resolve_with_source("payment.cashOnDelivery", &outlet("O1"), json!(null))
            .await
            .unwrap();
        assert_eq!(o1.value, json!(false));
        assert_eq!(o1.source, Some(SettingsLevel::Outlet));

        let o2 = settings
            .resolve_with_source("payment.cashOnDelivery", &outlet("O2"), json!(null))
            .await
            .unwrap();
        assert_eq!(o2.value, json!(true));
        assert_eq!(o2.source, Some(SettingsLevel::Platform));
    }

    #[tokio::test]
    async fn test_business_unit_derived_from_outlet() {
        let test = TestCore::seeded().await;
        let settings = test.core.settings();

        let footer = settings
            .resolve_with_source("receipt.footer", &outlet("O2"), json!(""))
            .await
            .unwrap();
        assert_eq!(footer.value, json!("Thank you"));
        assert_eq!(footer.source, Some(SettingsLevel::BusinessUnit));

        // O3 sits under BU2, which sets nothing
        let footer = settings
            .resolve_with_source("receipt.footer", &outlet("O3"), json!(""))
            .await
            .unwrap();
        assert_eq!(footer.value, json!(""));
        assert!(footer.is_default());
    }

    #[tokio::test]
    async fn test_default_is_stable_across_calls() {
        let test = TestCore::seeded().await;
        let settings = test.core.settings();
        let ctx = outlet("O1");

        let first = settings
            .resolve_setting("loyalty.pointsPerDollar", &ctx, json!(1))
            .await
            .unwrap();
        let second = settings
            .resolve_setting("loyalty.pointsPerDollar", &ctx, json!(1))
            .await
            .unwrap();
        assert_eq!(first, json!(1));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_organization_write_is_visible_and_persisted() {
        let test = TestCore::seeded().await;
        let settings = test.core.settings();
        let ctx = outlet("O2");

        // Warm the cache before writing
        settings
            .resolve_setting("payment.cashOnDelivery", &ctx, json!(null))
            .await
            .unwrap();

        settings
            .set_value(
                SettingsLevel::Organization,
                Some(TenantFactory::ACME_ID),
                "payment.cashOnDelivery",
                json!(false),
            )
            .await
            .unwrap();

        let resolved = settings
            .resolve_with_source("payment.cashOnDelivery", &ctx, json!(null))
            .await
            .unwrap();
        assert_eq!(resolved.value, json!(false));
        assert_eq!(resolved.source, Some(SettingsLevel::Organization));

        let stored = test
            .core
            .database()
            .settings_store()
            .load_document(SettingsLevel::Organization, TenantFactory::ACME_ID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, json!({"payment": {"cashOnDelivery": false}}));
    }

    #[tokio::test]
    async fn test_system_defaults_created_on_first_access() {
        let test = TestCore::new().await;
        let settings = test.core.settings();

        settings
            .set_value(SettingsLevel::System, None, "currency.code", json!("IDR"))
            .await
            .unwrap();

        let code = settings
            .resolve_setting("currency.code", &SettingsContext::new(), json!("USD"))
            .await
            .unwrap();
        assert_eq!(code, json!("IDR"));
    }

    #[tokio::test]
    async fn test_business_unit_write_needs_owner() {
        let test = TestCore::new().await;
        let err = test
            .core
            .settings()
            .set_value(SettingsLevel::BusinessUnit, None, "receipt.footer", json!("Hi"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 422);
    }

    #[tokio::test]
    async fn test_module_toggle_follows_cascade() {
        let test = TestCore::seeded().await;
        let settings = test.core.settings();

        assert!(settings.is_module_enabled("kitchen", &outlet("O2")).await.unwrap());
        assert!(!settings.is_module_enabled("kitchen", &outlet("O3")).await.unwrap());
        assert!(!settings.is_module_enabled("delivery", &outlet("O1")).await.unwrap());
    }
}
