//! Redis storage implementation
//!
//! This module provides the network cache tier.
//!
//! ## Module Structure
//!
//! - `pool` - Connection management, health checks and no-op mode
//! - `cache` - Key-value operations and the `NetworkCache` implementation
//! - `tests` - Module tests

mod cache;
mod pool;

pub use pool::{RedisConnection, RedisPool};
