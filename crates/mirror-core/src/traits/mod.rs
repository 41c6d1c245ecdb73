//! Traits (ports) implemented by the infrastructure layer

mod repositories;

pub use repositories::{ConversationRepository, MessagePage, MessageRepository, RepoResult};
