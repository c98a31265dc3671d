//! # tenant-access
//!
//! Access control and tenant resolution for multi-tenant business platforms.
//!
//! - [`auth::rbac`]: permission evaluation over roles, inherited roles,
//!   permission groups, scopes and conditions, with pluggable resolution
//!   strategies and default deny.
//! - [`auth::context`]: mandatory company / business unit / outlet filters for
//!   reads, and write and single-record checks against the actor's memberships.
//! - [`tenancy`]: request to tenant resolution and shared or dedicated
//!   connection routing.
//! - [`settings`]: Outlet → Business Unit → Organization → Platform → System
//!   settings cascade.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tenant_access::{AccessCore, Config};
//! use tenant_access::tenancy::RequestHints;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/access.yaml").await?;
//!     tenant_access::utils::logging::init_tracing(&config.logging);
//!
//!     let core = AccessCore::new(config).await?;
//!     let routed = core
//!         .tenancy()
//!         .resolve_connection(&RequestHints::host("acme.platform.io"))
//!         .await?;
//!     println!("tenant: {:?}", routed.tenant.map(|t| t.organization_id));
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod core;
pub mod settings;
pub mod storage;
pub mod tenancy;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::AccessCore;
pub use utils::error::{CoreError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
