//! Service context - dependency container for services
//!
//! Holds the repositories, the cache coherence manager, and the id generator
//! needed by services.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tracing::info;

use mirror_cache::{create_shared_pool, CacheCoherence, CoherenceSettings, RedisPoolConfig, RedisStore};
use mirror_common::config::{AppConfig, MessagingConfig};
use mirror_core::traits::{ConversationRepository, MessageRepository};
use mirror_core::{Snowflake, SnowflakeGenerator};
use mirror_db::{create_pool, run_migrations, DatabaseConfig, PgConversationRepository, PgMessageRepository};

use super::error::{ServiceError, ServiceResult};

/// Messaging knobs shared by the services
#[derive(Debug, Clone)]
pub struct MessagingSettings {
    /// Messages per cached page
    pub page_size: u32,
    /// Upper bound on a single store write
    pub write_timeout: Duration,
}

impl Default for MessagingSettings {
    fn default() -> Self {
        Self {
            page_size: 50,
            write_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&MessagingConfig> for MessagingSettings {
    fn from(config: &MessagingConfig) -> Self {
        Self {
            page_size: config.page_size,
            write_timeout: config.write_timeout(),
        }
    }
}

/// Service context containing all dependencies
///
/// This is the dependency container that gets passed to all services.
/// It provides access to:
/// - Conversation and message repositories
/// - The cache coherence manager
/// - Snowflake generator for ID generation
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    conversation_repo: Arc<dyn ConversationRepository>,
    message_repo: Arc<dyn MessageRepository>,

    // Cache
    cache: CacheCoherence,

    snowflake_generator: Arc<SnowflakeGenerator>,
    settings: MessagingSettings,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        conversation_repo: Arc<dyn ConversationRepository>,
        message_repo: Arc<dyn MessageRepository>,
        cache: CacheCoherence,
        snowflake_generator: Arc<SnowflakeGenerator>,
        settings: MessagingSettings,
    ) -> Self {
        Self {
            conversation_repo,
            message_repo,
            cache,
            snowflake_generator,
            settings,
        }
    }

    /// Build a context backed by PostgreSQL and Redis.
    ///
    /// Creates both pools and applies pending migrations. Redis connections
    /// are opened lazily, so an unreachable cache does not fail startup.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = create_pool(&DatabaseConfig::from(&config.database))
            .await
            .context("failed to connect to PostgreSQL")?;
        run_migrations(&pool)
            .await
            .context("failed to run migrations")?;

        let redis_pool = create_shared_pool(RedisPoolConfig::from(&config.redis))
            .context("failed to create Redis pool")?;
        let store = RedisStore::new(redis_pool).with_scan_count(config.cache.scan_count as usize);
        let cache = CacheCoherence::new(Arc::new(store), CoherenceSettings::from(&config.cache));

        info!(
            app = %config.app.name,
            worker_id = config.snowflake.worker_id,
            "Service context ready"
        );

        Ok(Self::new(
            Arc::new(PgConversationRepository::new(pool.clone())),
            Arc::new(PgMessageRepository::new(pool)),
            cache,
            Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)),
            MessagingSettings::from(&config.messaging),
        ))
    }

    // === Repositories ===

    /// Get the conversation repository
    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    /// Get the message repository
    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    // === Cache ===

    /// Get the cache coherence manager
    pub fn cache(&self) -> &CacheCoherence {
        &self.cache
    }

    // === Ids ===

    /// Get the snowflake ID generator
    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Allocate ids for both sides of a mirror pair
    pub fn generate_pair(&self) -> (Snowflake, Snowflake) {
        self.snowflake_generator.generate_pair()
    }

    pub fn settings(&self) -> &MessagingSettings {
        &self.settings
    }

    /// Run a store write under the configured deadline.
    ///
    /// On expiry the write future is dropped, which rolls back any open
    /// transaction.
    pub async fn within_write_timeout<T, F>(&self, write: F) -> ServiceResult<T>
    where
        F: Future<Output = Result<T, mirror_core::DomainError>>,
    {
        match tokio::time::timeout(self.settings.write_timeout, write).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => Err(ServiceError::WriteTimeout(self.settings.write_timeout)),
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("cache", &self.cache)
            .field("worker_id", &self.snowflake_generator.worker_id())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    conversation_repo: Option<Arc<dyn ConversationRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    cache: Option<CacheCoherence>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    settings: Option<MessagingSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation_repo(mut self, repo: Arc<dyn ConversationRepository>) -> Self {
        self.conversation_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn cache(mut self, cache: CacheCoherence) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn settings(mut self, settings: MessagingSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// The cache defaults to an in-process store and the settings to
    /// [`MessagingSettings::default`].
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if a repository or the generator is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.conversation_repo
                .ok_or_else(|| ServiceError::validation("conversation_repo is required"))?,
            self.message_repo
                .ok_or_else(|| ServiceError::validation("message_repo is required"))?,
            self.cache.unwrap_or_else(CacheCoherence::in_memory),
            self.snowflake_generator
                .ok_or_else(|| ServiceError::validation("snowflake_generator is required"))?,
            self.settings.unwrap_or_default(),
        ))
    }
}
