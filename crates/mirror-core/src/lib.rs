//! # mirror-core
//!
//! Domain layer containing mirrored conversation and message entities, value
//! objects, and repository traits.
//! This crate has zero dependencies on infrastructure (database, cache, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Conversation, ConversationPair, DisplayConfig, Message, MessagePair, MessageType, Resolved,
    ResolvedPair,
};
pub use error::DomainError;
pub use traits::{ConversationRepository, MessagePage, MessageRepository, RepoResult};
pub use value_objects::{ReactionEmoji, Snowflake, SnowflakeGenerator, SnowflakeParseError};
