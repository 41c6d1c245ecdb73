//! Cache key definitions.
//!
//! Defines the key naming conventions for derived views kept in the cache.

use mirror_core::Snowflake;

/// Key prefix for paged message lists
pub const MESSAGES_PREFIX: &str = "messages:";
/// Key prefix for per-user conversation lists
pub const CONVERSATIONS_PREFIX: &str = "conversations:";
/// Key prefix for cached user profiles
pub const USER_PREFIX: &str = "user:";

/// A single cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// One page of a conversation's message list
    MessagePage { conversation_id: Snowflake, page: u32 },
    /// A user's conversation list
    ConversationList(Snowflake),
    /// A user's profile, maintained outside this crate
    User(Snowflake),
}

impl CacheKey {
    #[must_use]
    pub fn message_page(conversation_id: Snowflake, page: u32) -> Self {
        Self::MessagePage { conversation_id, page }
    }

    #[must_use]
    pub fn conversation_list(user_id: Snowflake) -> Self {
        Self::ConversationList(user_id)
    }

    #[must_use]
    pub fn user(user_id: Snowflake) -> Self {
        Self::User(user_id)
    }

    /// Get the cache key string
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::MessagePage { conversation_id, page } => {
                format!("{MESSAGES_PREFIX}{conversation_id}:page:{page}")
            }
            Self::ConversationList(id) => format!("{CONVERSATIONS_PREFIX}{id}"),
            Self::User(id) => format!("{USER_PREFIX}{id}"),
        }
    }
}

/// A family of cache entries sharing a key prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPrefix {
    /// Every cached page of one conversation.
    ///
    /// Ends in `:page:` so conversation `12` never matches `123`.
    MessagePages(Snowflake),
    /// Every user's conversation list
    ConversationLists,
}

impl KeyPrefix {
    #[must_use]
    pub fn message_pages(conversation_id: Snowflake) -> Self {
        Self::MessagePages(conversation_id)
    }

    /// Get the prefix string
    #[must_use]
    pub fn prefix(&self) -> String {
        match self {
            Self::MessagePages(id) => format!("{MESSAGES_PREFIX}{id}:page:"),
            Self::ConversationLists => CONVERSATIONS_PREFIX.to_string(),
        }
    }

    /// Check whether a key belongs to this family
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        key.starts_with(&self.prefix())
    }
}

/// One invalidation to apply after a mutation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Invalidation {
    Exact(CacheKey),
    Prefix(KeyPrefix),
}

impl From<CacheKey> for Invalidation {
    fn from(key: CacheKey) -> Self {
        Self::Exact(key)
    }
}

impl From<KeyPrefix> for Invalidation {
    fn from(prefix: KeyPrefix) -> Self {
        Self::Prefix(prefix)
    }
}
