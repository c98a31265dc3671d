//! Database storage implementation using SeaORM
//!
//! Organizations, outlets and settings documents live here. Tenant-scoped
//! business collections are owned by callers; the context loader reads them
//! by table and column name.

/// Database entities module
pub mod entities;
/// Database migration module
pub mod migration;
/// SeaORM database implementation module
pub mod seaorm_db;

// Re-export the main database interface
pub use seaorm_db::SeaOrmDatabase as Database;
pub use seaorm_db::{
    DatabaseBackendType, SeaOrmContextLoader, SeaOrmDatabase, SeaOrmSettingsStore,
    SeaOrmTenantStore,
};
