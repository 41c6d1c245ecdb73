//! # mirror-cache
//!
//! Cache layer for derived views of mirrored conversations.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Stores**: [`CacheStore`] capability with Redis and in-process backends
//! - **Keys**: Key shapes for message pages, conversation lists, and profiles
//! - **Coherence**: Best-effort invalidation and read-through
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mirror_cache::{
//!     create_shared_pool, CacheCoherence, CoherenceSettings, KeyPrefix, RedisPoolConfig, RedisStore,
//! };
//!
//! let pool = create_shared_pool(RedisPoolConfig::default())?;
//! let coherence = CacheCoherence::new(
//!     Arc::new(RedisStore::new(pool)),
//!     CoherenceSettings::default(),
//! );
//!
//! coherence.invalidate(&KeyPrefix::message_pages(conversation_id).into()).await;
//! ```

pub mod coherence;
pub mod error;
pub mod keys;
pub mod pool;
pub mod store;

pub use coherence::{CacheCoherence, CoherenceSettings};
pub use error::{CacheError, CacheResult};
pub use keys::{
    CacheKey, Invalidation, KeyPrefix, CONVERSATIONS_PREFIX, MESSAGES_PREFIX, USER_PREFIX,
};
pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};
pub use store::{CacheStore, InMemoryStore, RedisStore};
