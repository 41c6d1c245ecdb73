//! Cache store backends.
//!
//! A [`CacheStore`] is the raw key/value capability the coherence manager
//! works through. Values are opaque strings; encoding happens above.

mod memory_store;
mod redis_store;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::CacheResult;

pub use memory_store::InMemoryStore;
pub use redis_store::RedisStore;

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value by key
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a value, replacing any existing one
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()>;

    /// Delete a key; returns whether it existed
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Delete every key starting with `prefix`; returns how many were removed
    async fn delete_by_prefix(&self, prefix: &str) -> CacheResult<u64>;
}
