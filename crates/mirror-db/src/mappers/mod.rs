//! Entity to model mappers
//!
//! Conversions between domain entities (mirror-core) and database models.
//! - `From`/`TryFrom<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database operations

mod conversation;
mod message;

pub use conversation::ConversationInsert;
pub use message::MessageInsert;
