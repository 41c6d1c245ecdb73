//! Cache coherence manager.
//!
//! Keeps derived views (message pages, conversation lists, user profiles)
//! consistent with the store by invalidating them after mutations and
//! filling them on read. Every cache failure is logged and swallowed: the
//! store is the source of truth and a stale entry heals on the next
//! read-through after its invalidation succeeds or its TTL expires.

use futures_util::future::join_all;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use mirror_core::Snowflake;

use crate::error::{CacheError, CacheResult};
use crate::keys::{CacheKey, Invalidation, KeyPrefix};
use crate::store::{CacheStore, InMemoryStore};

/// Tuning for the coherence manager
#[derive(Debug, Clone)]
pub struct CoherenceSettings {
    /// Lifetime of read-through entries (`None` = no expiry)
    pub ttl: Option<Duration>,
    /// Upper bound on any single cache round trip
    pub op_timeout: Duration,
}

impl Default for CoherenceSettings {
    fn default() -> Self {
        Self {
            ttl: Some(Duration::from_secs(3600)),
            op_timeout: Duration::from_millis(500),
        }
    }
}

impl From<&mirror_common::CacheConfig> for CoherenceSettings {
    fn from(config: &mirror_common::CacheConfig) -> Self {
        Self {
            ttl: config.ttl(),
            op_timeout: config.op_timeout(),
        }
    }
}

/// Best-effort invalidation and read-through over an injected [`CacheStore`]
#[derive(Clone)]
pub struct CacheCoherence {
    store: Arc<dyn CacheStore>,
    settings: CoherenceSettings,
}

impl std::fmt::Debug for CacheCoherence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCoherence")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CacheCoherence {
    pub fn new(store: Arc<dyn CacheStore>, settings: CoherenceSettings) -> Self {
        Self { store, settings }
    }

    /// Coherence manager over a fresh in-process store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()), CoherenceSettings::default())
    }

    #[must_use]
    pub fn settings(&self) -> &CoherenceSettings {
        &self.settings
    }

    /// Run one store call under the operation timeout, logging any failure
    async fn bounded<T>(
        &self,
        op: &'static str,
        key: &str,
        call: impl Future<Output = CacheResult<T>>,
    ) -> Option<T> {
        let outcome = match tokio::time::timeout(self.settings.op_timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CacheError::Timeout(self.settings.op_timeout)),
        };

        match outcome {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(op, key, error = %e, "Cache operation failed; continuing without cache");
                None
            }
        }
    }

    /// Remove a single entry. An absent key is not an error.
    #[instrument(skip(self))]
    pub async fn invalidate_exact(&self, key: &str) {
        if let Some(existed) = self.bounded("delete", key, self.store.delete(key)).await {
            debug!(key, existed, "Cache entry invalidated");
        }
    }

    /// Remove every entry whose key starts with `prefix`
    #[instrument(skip(self))]
    pub async fn invalidate_by_prefix(&self, prefix: &str) {
        if let Some(removed) = self
            .bounded("delete_by_prefix", prefix, self.store.delete_by_prefix(prefix))
            .await
        {
            debug!(prefix, removed, "Cache entries invalidated by prefix");
        }
    }

    /// Apply one invalidation
    pub async fn invalidate(&self, invalidation: &Invalidation) {
        match invalidation {
            Invalidation::Exact(key) => self.invalidate_exact(&key.name()).await,
            Invalidation::Prefix(prefix) => self.invalidate_by_prefix(&prefix.prefix()).await,
        }
    }

    /// Apply a set of invalidations concurrently
    pub async fn invalidate_all(&self, invalidations: impl IntoIterator<Item = Invalidation>) {
        let invalidations: Vec<Invalidation> = invalidations.into_iter().collect();
        join_all(invalidations.iter().map(|inv| self.invalidate(inv))).await;
    }

    /// Drop a user's cached profile and every conversation list, since
    /// counterparts' lists embed the profile too
    #[instrument(skip(self))]
    pub async fn invalidate_user_views(&self, user_id: Snowflake) {
        self.invalidate_all([
            CacheKey::user(user_id).into(),
            KeyPrefix::ConversationLists.into(),
        ])
        .await;
    }

    /// Return the cached value for `key`, or compute it with `loader` and
    /// cache the result.
    ///
    /// Concurrent misses may each run the loader. Loader errors propagate
    /// and nothing is cached for them.
    #[instrument(skip(self, loader))]
    pub async fn read_through<T, E, F, Fut>(&self, key: &str, loader: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.bounded("get", key, self.store.get(key)).await.flatten() {
            Some(raw) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    debug!(key, "Cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(key, error = %CacheError::from(e), "Discarding undecodable cache entry");
                }
            },
            None => debug!(key, "Cache miss"),
        }

        let value = loader().await?;

        match serde_json::to_string(&value) {
            Ok(raw) => {
                self.bounded("set", key, self.store.set(key, raw, self.settings.ttl))
                    .await;
            }
            Err(e) => warn!(key, error = %CacheError::from(e), "Cache value not encodable"),
        }

        Ok(value)
    }
}
