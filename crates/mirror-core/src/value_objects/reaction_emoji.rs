//! Reaction emoji - the fixed set of emoji a message may carry

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// One of the allowed message reactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionEmoji {
    ThumbsUp,
    Heart,
    Laugh,
    Wow,
    Sad,
    Angry,
}

impl ReactionEmoji {
    /// Every allowed reaction, in display order
    pub const ALL: [ReactionEmoji; 6] = [
        Self::ThumbsUp,
        Self::Heart,
        Self::Laugh,
        Self::Wow,
        Self::Sad,
        Self::Angry,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThumbsUp => "👍",
            Self::Heart => "❤️",
            Self::Laugh => "😂",
            Self::Wow => "😮",
            Self::Sad => "😢",
            Self::Angry => "😡",
        }
    }

    /// Parse an optional client-supplied reaction.
    ///
    /// `None` and blank input mean "clear the reaction".
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, DomainError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }
}

impl FromStr for ReactionEmoji {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|emoji| emoji.as_str() == s)
            .ok_or_else(|| DomainError::InvalidEmoji(s.to_string()))
    }
}

impl fmt::Display for ReactionEmoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReactionEmoji {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReactionEmoji {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
