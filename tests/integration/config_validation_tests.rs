//! Configuration loading and validation through the public API

#[cfg(test)]
mod tests {
    use crate::common::TestCore;
    use tenant_access::auth::context::ContextField;
    use tenant_access::config::{CollectionConfig, Config};
    use tenant_access::{AccessCore, CoreError};

    #[test]
    fn test_yaml_config_with_collections() {
        let config = Config::from_yaml_str(
            r#"
storage:
  database:
    url: "sqlite::memory:"
tenancy:
  reserved_subdomains: [www, api, app, admin]
context:
  collections:
    order:
      fields: [company, businessUnit, outlet]
      primary: outlet
"#,
        )
        .unwrap();

        assert_eq!(config.tenancy.reserved_subdomains.len(), 4);
        let order = &config.context.collections["order"];
        assert_eq!(order.primary_field(), Some(ContextField::Outlet));
        assert!(order.allow_unscoped);
    }

    #[test]
    fn test_unsupported_database_is_rejected() {
        let err = Config::from_yaml_str(
            r#"
storage:
  database:
    url: "mysql://localhost/platform"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_primary_field_must_be_exposed() {
        let mut collection = CollectionConfig::new([ContextField::Company]);
        collection.primary = Some(ContextField::Outlet);

        let mut config = TestCore::config();
        config.context = config.context.with_collection("invoice", collection);
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_access_core_rejects_invalid_config() {
        let mut config = TestCore::config();
        config.cache.tenant_ttl = 0;

        let err = AccessCore::new(config).await.err().unwrap();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[tokio::test]
    async fn test_access_core_health_check() {
        let test = TestCore::new().await;
        test.core.health_check().await.unwrap();
    }
}
