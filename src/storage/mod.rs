//! Storage layer
//!
//! The shared database (SeaORM) and the network cache tier (Redis).

/// Database storage module
pub mod database;
/// Redis cache module
pub mod redis;
