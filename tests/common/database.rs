//! Test access core
//!
//! Each instance owns an isolated in-memory SQLite database and runs with the
//! network cache disabled, so only the local cache tier is exercised.

use super::fixtures::{TenantFactory, context_config};
use sea_orm::ConnectionTrait;
use serde_json::json;
use tenant_access::config::{Config, DatabaseConfig};
use tenant_access::settings::{SINGLETON_OWNER, SettingsLevel, SettingsStore};
use tenant_access::storage::database::entities::outlet;
use tenant_access::{AccessCore, Result};

pub struct TestCore {
    pub core: AccessCore,
}

impl TestCore {
    pub fn config() -> Config {
        let mut config = Config::default();
        config.storage.database = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Default::default()
        };
        config.storage.redis.enabled = false;
        config.context = context_config();
        config
    }

    pub async fn new() -> Self {
        let core = AccessCore::new(Self::config())
            .await
            .expect("Failed to build access core");
        Self { core }
    }

    /// Core with tenants, outlets, settings and a `products` table
    pub async fn seeded() -> Self {
        let test = Self::new().await;
        test.seed().await.expect("Failed to seed test data");
        test
    }

    async fn seed(&self) -> Result<()> {
        let tenants = self.core.database().tenant_store();
        for tenant in TenantFactory::all() {
            tenants.save(&tenant).await?;
        }

        let settings = self.core.database().settings_store();
        for (id, business_unit) in [("O1", "BU1"), ("O2", "BU1"), ("O3", "BU2")] {
            settings
                .save_outlet(outlet::Model {
                    id: id.to_string(),
                    organization_id: TenantFactory::ACME_ID.to_string(),
                    company: Some("C1".to_string()),
                    business_unit: Some(business_unit.to_string()),
                    name: format!("Outlet {}", id),
                    created_at: chrono::Utc::now().into(),
                })
                .await?;
        }

        settings
            .save_document(
                SettingsLevel::Outlet,
                "O1",
                json!({"payment": {"cashOnDelivery": false}}),
            )
            .await?;
        settings
            .save_document(
                SettingsLevel::BusinessUnit,
                "BU1",
                json!({
                    "receipt": {"footer": "Thank you"},
                    "modules": {"kitchen": {"enabled": true}}
                }),
            )
            .await?;
        settings
            .save_document(
                SettingsLevel::Platform,
                SINGLETON_OWNER,
                json!({"payment": {"cashOnDelivery": true}, "tax": {"rate": 11}}),
            )
            .await?;

        let connection = self.core.database().connection();
        for sql in [
            "CREATE TABLE products (id TEXT PRIMARY KEY, name TEXT NOT NULL, business_unit TEXT, outlet TEXT)",
            "INSERT INTO products VALUES ('p1', 'Tea', 'BU1', 'O1')",
            "INSERT INTO products VALUES ('p2', 'Coffee', 'BU1', 'O2')",
            "INSERT INTO products VALUES ('p3', 'Cake', 'BU2', 'O3')",
            "INSERT INTO products VALUES ('p4', 'Water', NULL, NULL)",
        ] {
            connection.execute_unprepared(sql).await?;
        }
        Ok(())
    }
}
