//! Conversation mirror service
//!
//! Finds or lazily creates the pair of conversations that back a two-party
//! thread, lists a user's conversations, and marks them read.

use tracing::{info, instrument, warn};

use mirror_cache::CacheKey;
use mirror_core::entities::{Conversation, ConversationPair, DisplayConfig, ResolvedPair};
use mirror_core::{DomainError, Snowflake};

use crate::dto::ConversationResponse;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Conversation mirror service
pub struct ConversationMirrorService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationMirrorService<'a> {
    /// Create a new ConversationMirrorService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Find the pair between `owner_id` and `counterpart_id`, creating it if
    /// none exists.
    ///
    /// With `hint`, the owner's conversation must already exist; nothing is
    /// created. `display` is only used when a new pair is created.
    #[instrument(skip(self, display))]
    pub async fn resolve_pair(
        &self,
        owner_id: Snowflake,
        counterpart_id: Snowflake,
        hint: Option<Snowflake>,
        display: DisplayConfig,
    ) -> ServiceResult<ResolvedPair> {
        if let Some(pair) = self.find_pair(owner_id, counterpart_id, hint).await? {
            return Ok(ResolvedPair::existing(pair));
        }

        let pair = ConversationPair::new(self.ctx.generate_pair(), owner_id, counterpart_id, display)?;

        match self
            .ctx
            .within_write_timeout(self.ctx.conversation_repo().create_pair(&pair))
            .await
        {
            Ok(()) => {
                info!(
                    origin_id = %pair.origin.id,
                    mirror_id = %pair.mirror.id,
                    "Conversation pair created"
                );
                Ok(ResolvedPair::created(pair))
            }
            Err(ServiceError::Domain(DomainError::ConversationPairExists { .. })) => self
                .after_lost_race(owner_id, counterpart_id)
                .await
                .map(ResolvedPair::existing),
            Err(e) => Err(e),
        }
    }

    /// Find the existing pair without creating one.
    ///
    /// With `hint`, the owner's conversation must exist and be between the
    /// two participants.
    pub(crate) async fn find_pair(
        &self,
        owner_id: Snowflake,
        counterpart_id: Snowflake,
        hint: Option<Snowflake>,
    ) -> ServiceResult<Option<ConversationPair>> {
        if owner_id == counterpart_id {
            return Err(DomainError::InvalidParticipants.into());
        }

        match hint {
            Some(conversation_id) => {
                let origin = self
                    .ctx
                    .conversation_repo()
                    .find_by_id(conversation_id)
                    .await?
                    .filter(|c| c.is_between(owner_id, counterpart_id))
                    .ok_or(DomainError::ConversationNotFound(conversation_id))?;
                self.load_mirror(origin).await.map(Some)
            }
            None => self.find_existing(owner_id, counterpart_id).await,
        }
    }

    /// Re-read the pair another caller created first
    pub(crate) async fn after_lost_race(
        &self,
        owner_id: Snowflake,
        counterpart_id: Snowflake,
    ) -> ServiceResult<ConversationPair> {
        warn!("Lost conversation pair creation race; using the existing pair");
        self.find_existing(owner_id, counterpart_id)
            .await?
            .ok_or_else(|| ServiceError::internal("conversation pair vanished after a creation conflict"))
    }

    /// Get a conversation, which must belong to `owner_id`
    #[instrument(skip(self))]
    pub async fn find_owned(
        &self,
        owner_id: Snowflake,
        conversation_id: Snowflake,
    ) -> ServiceResult<Conversation> {
        self.ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .filter(|c| c.owner_id == owner_id)
            .ok_or_else(|| DomainError::ConversationNotFound(conversation_id).into())
    }

    /// List the owner's conversations, most recent activity first
    #[instrument(skip(self))]
    pub async fn list_conversations(
        &self,
        owner_id: Snowflake,
    ) -> ServiceResult<Vec<ConversationResponse>> {
        let key = CacheKey::conversation_list(owner_id).name();
        self.ctx
            .cache()
            .read_through(&key, || async {
                let conversations = self.ctx.conversation_repo().find_by_owner(owner_id).await?;
                Ok::<_, ServiceError>(conversations.iter().map(ConversationResponse::from).collect())
            })
            .await
    }

    /// Clear the unread flag on the owner's conversation
    #[instrument(skip(self))]
    pub async fn mark_read(&self, owner_id: Snowflake, conversation_id: Snowflake) -> ServiceResult<()> {
        let conversation = self.find_owned(owner_id, conversation_id).await?;
        if conversation.unread {
            self.ctx
                .within_write_timeout(self.ctx.conversation_repo().set_unread(conversation.id, false))
                .await?;
        }

        self.ctx
            .cache()
            .invalidate_exact(&CacheKey::conversation_list(owner_id).name())
            .await;

        info!("Conversation marked read");
        Ok(())
    }

    async fn find_existing(
        &self,
        owner_id: Snowflake,
        counterpart_id: Snowflake,
    ) -> ServiceResult<Option<ConversationPair>> {
        match self
            .ctx
            .conversation_repo()
            .find_by_participants(owner_id, counterpart_id)
            .await?
        {
            Some(origin) => self.load_mirror(origin).await.map(Some),
            None => Ok(None),
        }
    }

    /// Load the counterpart's view and check that both point at each other
    async fn load_mirror(&self, origin: Conversation) -> ServiceResult<ConversationPair> {
        let mirror = self
            .ctx
            .conversation_repo()
            .find_by_id(origin.mirror_id)
            .await?
            .ok_or_else(|| {
                ServiceError::internal(format!(
                    "conversation {} points at missing mirror {}",
                    origin.id, origin.mirror_id
                ))
            })?;

        Ok(ConversationPair::from_loaded(origin, mirror)?)
    }
}
