//! Domain entities - core business objects

mod conversation;
mod message;
mod resolved;

pub use conversation::{Conversation, ConversationPair, DisplayConfig};
pub use message::{Message, MessagePair, MessageType};
pub use resolved::{Resolved, ResolvedPair};
