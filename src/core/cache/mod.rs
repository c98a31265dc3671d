//! Two-tier caching for tenant, settings and permission lookups
//!
//! The network tier (Redis) is shared between processes; the local tier (moka)
//! keeps the process serving when the network tier is slow or down.

mod layered;
#[cfg(test)]
mod tests;
mod types;
mod versions;

pub use layered::LayeredCache;
pub use types::{MemoryNetworkCache, NetworkCache};
pub use versions::{CacheVersions, EntityType, VersionSnapshot};
