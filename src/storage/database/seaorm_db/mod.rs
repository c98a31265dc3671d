// Module declarations
mod connection;
mod context_loader;
mod settings_store;
mod tenant_store;
mod types;

// Re-export public types
pub use context_loader::SeaOrmContextLoader;
pub use settings_store::SeaOrmSettingsStore;
pub use tenant_store::SeaOrmTenantStore;
pub use types::{DatabaseBackendType, SeaOrmDatabase};
