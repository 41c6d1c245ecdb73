//! Redis-backed cache store

use async_trait::async_trait;
use std::time::Duration;
use tracing::instrument;

use crate::error::CacheResult;
use crate::pool::SharedRedisPool;

use super::CacheStore;

/// Cache store over a shared Redis pool
#[derive(Debug, Clone)]
pub struct RedisStore {
    pool: SharedRedisPool,
    scan_count: usize,
}

impl RedisStore {
    /// Default `SCAN` batch hint
    pub const DEFAULT_SCAN_COUNT: usize = 100;

    pub fn new(pool: SharedRedisPool) -> Self {
        Self {
            pool,
            scan_count: Self::DEFAULT_SCAN_COUNT,
        }
    }

    /// Set the `SCAN` batch hint used by prefix deletion
    #[must_use]
    pub fn with_scan_count(mut self, scan_count: usize) -> Self {
        self.scan_count = scan_count.max(1);
        self
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.pool.get_raw(key).await?)
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        Ok(self.pool.set_raw(key, &value, ttl).await?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> CacheResult<bool> {
        Ok(self.pool.delete(key).await?)
    }

    #[instrument(skip(self))]
    async fn delete_by_prefix(&self, prefix: &str) -> CacheResult<u64> {
        Ok(self.pool.delete_by_prefix(prefix, self.scan_count).await?)
    }
}
