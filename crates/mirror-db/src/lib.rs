//! # mirror-db
//!
//! Database layer implementing the mirror-core repository traits with
//! PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! - Connection pool management and bundled migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations that write mirror pairs in one transaction
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mirror_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use mirror_db::repositories::PgConversationRepository;
//!
//! async fn example(config: &DatabaseConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(config).await?;
//!     run_migrations(&pool).await?;
//!     let conversations = PgConversationRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgConversationRepository, PgMessageRepository};
