//! # mirror-service
//!
//! Application layer for mirrored two-party conversations.
//!
//! - [`ConversationMirrorService`]: find or lazily create a conversation pair
//! - [`MessageMirrorService`]: write a message and its mirror in one unit
//! - [`ReactionSyncService`]: keep a reaction equal on both copies
//!
//! Every mutation invalidates the affected cached views after it commits.

pub mod dto;
pub mod services;

pub use services::{
    ConversationMirrorService, ErrorKind, MessageMirrorService, MessagingSettings,
    ReactionSyncService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};
