//! Reaction synchronizer
//!
//! A reaction lives on both copies of a message. Setting it on one copy
//! always sets it on the other in the same guarded update.

use tracing::{info, instrument};

use mirror_cache::KeyPrefix;
use mirror_core::{DomainError, ReactionEmoji};

use crate::dto::{ReactRequest, ReactionResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::parse_id;

/// Reaction synchronizer service
pub struct ReactionSyncService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionSyncService<'a> {
    /// Create a new ReactionSyncService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Set or clear the reaction on a message and its mirror.
    ///
    /// Repeating the same reaction is a no-op in effect.
    #[instrument(skip(self, request), fields(message_id = %request.message_id))]
    pub async fn react(&self, request: ReactRequest) -> ServiceResult<ReactionResponse> {
        let emoji = ReactionEmoji::parse_optional(request.emoji.as_deref())?;
        let message_id = parse_id("message_id", &request.message_id)?;
        let mirror_message_id = parse_id("mirror_message_id", &request.mirror_message_id)?;

        let repo = self.ctx.message_repo();
        let (message, mirror) = match (
            repo.find_by_id(message_id).await?,
            repo.find_by_id(mirror_message_id).await?,
        ) {
            (Some(message), Some(mirror)) if message.is_mirror_of(&mirror) => (message, mirror),
            // A missing copy is no mirror either
            _ => {
                return Err(DomainError::MismatchedMirror {
                    message_id,
                    mirror_message_id,
                }
                .into())
            }
        };

        self.ctx
            .within_write_timeout(self.ctx.message_repo().set_reaction_pair(
                message_id,
                mirror_message_id,
                emoji,
            ))
            .await?;

        self.ctx
            .cache()
            .invalidate_all([
                KeyPrefix::message_pages(message.conversation_id).into(),
                KeyPrefix::message_pages(mirror.conversation_id).into(),
            ])
            .await;

        info!(
            %mirror_message_id,
            emoji = emoji.map_or("none", ReactionEmoji::as_str),
            "Reaction synchronized"
        );

        Ok(ReactionResponse {
            message_id: message_id.to_string(),
            mirror_message_id: mirror_message_id.to_string(),
            emoji: emoji.map(|e| e.to_string()),
        })
    }
}
