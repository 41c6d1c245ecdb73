//! Database models - SQLx-compatible structs for PostgreSQL tables

mod conversation;
mod message;

pub use conversation::ConversationModel;
pub use message::MessageModel;
