//! Resolution results - entities tagged with whether they were just created

use crate::entities::{Conversation, ConversationPair};

/// A value together with whether this call created it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub created: bool,
}

impl<T> Resolved<T> {
    #[inline]
    pub fn existing(value: T) -> Self {
        Self { value, created: false }
    }

    #[inline]
    pub fn created(value: T) -> Self {
        Self { value, created: true }
    }
}

/// Both sides of a conversation thread as returned by pair resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPair {
    /// The requesting owner's view
    pub origin: Resolved<Conversation>,
    /// The counterpart's view
    pub mirror: Resolved<Conversation>,
}

impl ResolvedPair {
    pub fn existing(pair: ConversationPair) -> Self {
        Self {
            origin: Resolved::existing(pair.origin),
            mirror: Resolved::existing(pair.mirror),
        }
    }

    pub fn created(pair: ConversationPair) -> Self {
        Self {
            origin: Resolved::created(pair.origin),
            mirror: Resolved::created(pair.mirror),
        }
    }
}
