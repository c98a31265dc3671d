//! Common test utilities for tenant-access
//!
//! - In-memory SQLite access core
//! - Fixtures for tenants, roles and actors
//! - Error assertions

pub mod assertions;
pub mod database;
pub mod fixtures;

// Re-export commonly used items
pub use database::TestCore;
pub use fixtures::{ActorFactory, RoleFactory, TenantFactory};
