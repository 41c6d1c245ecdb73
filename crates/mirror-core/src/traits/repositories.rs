//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every operation that writes a mirror pair
//! writes both rows or neither.

use async_trait::async_trait;

use crate::entities::{Conversation, ConversationPair, Message, MessagePair};
use crate::error::DomainError;
use crate::value_objects::{ReactionEmoji, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Conversation Repository
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find conversation by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>>;

    /// Find the owner's view of the thread with `counterpart_id`
    async fn find_by_participants(
        &self,
        owner_id: Snowflake,
        counterpart_id: Snowflake,
    ) -> RepoResult<Option<Conversation>>;

    /// List the owner's conversations, most recent activity first
    async fn find_by_owner(&self, owner_id: Snowflake) -> RepoResult<Vec<Conversation>>;

    /// Insert both sides of a new thread atomically.
    ///
    /// Fails with `ConversationPairExists` when either participant already
    /// has a view of this thread.
    async fn create_pair(&self, pair: &ConversationPair) -> RepoResult<()>;

    /// Set the unread flag on one conversation
    async fn set_unread(&self, id: Snowflake, unread: bool) -> RepoResult<()>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// Page selector for message listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessagePage {
    /// Zero-based page number
    pub page: u32,
    pub size: u32,
}

impl MessagePage {
    pub const DEFAULT_SIZE: u32 = 50;
    pub const MAX_SIZE: u32 = 100;

    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, Self::MAX_SIZE),
        }
    }

    /// Number of rows to skip
    #[inline]
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    #[inline]
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for MessagePage {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// List messages in a conversation, newest first
    async fn find_page(
        &self,
        conversation_id: Snowflake,
        page: MessagePage,
    ) -> RepoResult<Vec<Message>>;

    /// Insert both copies of a message and update conversation metadata
    /// in one transaction.
    ///
    /// Both conversations get `last_message_at = created_at`; the sender's
    /// side is marked read and the mirror side unread.
    async fn create_pair(&self, pair: &MessagePair) -> RepoResult<()>;

    /// Insert a new conversation pair together with its first message pair
    /// in one transaction, so a failed first send leaves no conversation
    /// behind.
    ///
    /// Fails with `ConversationPairExists` under the same rule as
    /// [`ConversationRepository::create_pair`].
    async fn create_first_pair(
        &self,
        conversations: &ConversationPair,
        messages: &MessagePair,
    ) -> RepoResult<()>;

    /// Set the same reaction on a message and its mirror in one guarded
    /// update. Fails with `MismatchedMirror` unless the two rows point at
    /// each other.
    async fn set_reaction_pair(
        &self,
        message_id: Snowflake,
        mirror_message_id: Snowflake,
        reaction: Option<ReactionEmoji>,
    ) -> RepoResult<()>;
}
