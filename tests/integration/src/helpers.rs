//! Test helpers for integration tests
//!
//! Provides service harnesses over the in-memory store, cache doubles that
//! fail or hang, and an environment check for tests that need live
//! PostgreSQL and Redis.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mirror_cache::{CacheCoherence, CacheError, CacheResult, CacheStore, CoherenceSettings, InMemoryStore};
use mirror_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use mirror_core::SnowflakeGenerator;
use mirror_service::{MessagingSettings, ServiceContext, ServiceContextBuilder};

use crate::memory::MemoryStore;

/// Install a test subscriber once; later calls are no-ops
pub fn init_test_tracing() {
    let _ = try_init_tracing_with_config(TracingConfig::test());
}

/// Services wired to an in-memory store and an inspectable cache
pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub cache_store: Arc<InMemoryStore>,
    pub ctx: ServiceContext,
}

impl TestHarness {
    pub fn new() -> Self {
        let cache_store = Arc::new(InMemoryStore::new());
        let cache = CacheCoherence::new(cache_store.clone(), CoherenceSettings::default());
        Self::build(cache_store, cache, MessagingSettings::default())
    }

    /// Harness whose coherence manager talks to `store` instead of the
    /// inspectable in-memory cache
    pub fn with_cache_store(store: Arc<dyn CacheStore>) -> Self {
        let settings = CoherenceSettings {
            ttl: None,
            op_timeout: Duration::from_millis(50),
        };
        let cache = CacheCoherence::new(store, settings);
        Self::build(Arc::new(InMemoryStore::new()), cache, MessagingSettings::default())
    }

    pub fn with_settings(settings: MessagingSettings) -> Self {
        let cache_store = Arc::new(InMemoryStore::new());
        let cache = CacheCoherence::new(cache_store.clone(), CoherenceSettings::default());
        Self::build(cache_store, cache, settings)
    }

    fn build(cache_store: Arc<InMemoryStore>, cache: CacheCoherence, settings: MessagingSettings) -> Self {
        init_test_tracing();
        let store = Arc::new(MemoryStore::new());
        let ctx = ServiceContextBuilder::new()
            .conversation_repo(store.clone())
            .message_repo(store.clone())
            .cache(cache)
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(7)))
            .settings(settings)
            .build()
            .expect("all dependencies supplied");

        Self {
            store,
            cache_store,
            ctx,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache backend whose every call fails as if Redis were down
pub struct UnreachableCache;

#[async_trait]
impl CacheStore for UnreachableCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::Backend("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Option<Duration>) -> CacheResult<()> {
        Err(CacheError::Backend("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> CacheResult<bool> {
        Err(CacheError::Backend("connection refused".into()))
    }

    async fn delete_by_prefix(&self, _prefix: &str) -> CacheResult<u64> {
        Err(CacheError::Backend("connection refused".into()))
    }
}

/// Cache backend whose every call never completes
pub struct StalledCache;

#[async_trait]
impl CacheStore for StalledCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Option<Duration>) -> CacheResult<()> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &str) -> CacheResult<bool> {
        std::future::pending().await
    }

    async fn delete_by_prefix(&self, _prefix: &str) -> CacheResult<u64> {
        std::future::pending().await
    }
}

/// Load configuration for tests against live PostgreSQL and Redis.
///
/// Returns `None` (and the test should skip) unless both `DATABASE_URL`
/// and `REDIS_URL` are set.
pub fn live_test_config() -> Option<AppConfig> {
    match AppConfig::from_env() {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Skipping live test: {e}");
            None
        }
    }
}
