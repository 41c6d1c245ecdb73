//! Business logic services
//!
//! Each service borrows a [`ServiceContext`] and orchestrates repository
//! writes followed by cache invalidation.

pub mod context;
pub mod conversation;
pub mod error;
pub mod message;
pub mod reaction;

pub use context::{MessagingSettings, ServiceContext, ServiceContextBuilder};
pub use conversation::ConversationMirrorService;
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use message::MessageMirrorService;
pub use reaction::ReactionSyncService;

use mirror_core::Snowflake;

/// Parse a string id from a request DTO
pub(crate) fn parse_id(field: &str, raw: &str) -> ServiceResult<Snowflake> {
    raw.parse::<Snowflake>()
        .map_err(|_| ServiceError::validation(format!("Invalid {field}")))
}
