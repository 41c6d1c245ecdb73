//! Value objects - immutable types that represent domain concepts

mod reaction_emoji;
mod snowflake;

pub use reaction_emoji::ReactionEmoji;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
