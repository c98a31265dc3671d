//! Tenant resolution and connection routing

pub mod hostname;
pub mod resolver;
pub mod router;
pub mod service;
pub mod types;

pub use resolver::TenantResolver;
pub use router::{ConnectionRouter, Connector, Route, RouteKind, SeaOrmConnector};
pub use service::{TenancyService, TenantRoute};
pub use types::{DeploymentType, RequestHints, TenantKey, TenantRecord, TenantStore};
