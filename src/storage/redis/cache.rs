//! Basic Redis cache operations
//!
//! Key-value operations used by the network cache tier.

use super::pool::RedisPool;
use crate::core::cache::NetworkCache;
use crate::utils::error::{CoreError, Result};
use async_trait::async_trait;
use redis::AsyncCommands;

impl RedisPool {
    /// Get a value from cache
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.noop_mode {
            return Ok(None);
        }

        let key = self.prefixed(key);
        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let value: Option<String> = c.get(&key).await.map_err(CoreError::Redis)?;
            Ok(value)
        } else {
            Ok(None)
        }
    }

    /// Set a key-value pair with optional TTL
    pub async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let key = self.prefixed(key);
        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            match ttl {
                Some(ttl_seconds) if ttl_seconds > 0 => {
                    let _: () = c
                        .set_ex(&key, value, ttl_seconds)
                        .await
                        .map_err(CoreError::Redis)?;
                }
                _ => {
                    let _: () = c.set(&key, value).await.map_err(CoreError::Redis)?;
                }
            }
        }
        Ok(())
    }

    /// Delete a key
    pub async fn delete(&self, key: &str) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let key = self.prefixed(key);
        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let _: () = c.del(&key).await.map_err(CoreError::Redis)?;
        }
        Ok(())
    }

    /// Increment a counter by one
    pub async fn increment(&self, key: &str) -> Result<i64> {
        if self.noop_mode {
            return Err(CoreError::Cache("Redis unavailable (no-op mode)".to_string()));
        }

        let key = self.prefixed(key);
        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let new_value: i64 = c.incr(&key, 1).await.map_err(CoreError::Redis)?;
            Ok(new_value)
        } else {
            Err(CoreError::Cache("Redis connection missing".to_string()))
        }
    }
}

#[async_trait]
impl NetworkCache for RedisPool {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        RedisPool::get(self, key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        RedisPool::set(self, key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        RedisPool::delete(self, key).await
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        self.increment(key).await
    }

    fn is_enabled(&self) -> bool {
        !self.noop_mode
    }
}
