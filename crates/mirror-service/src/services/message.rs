//! Message mirror service
//!
//! Writes every message as two copies, one in each participant's
//! conversation, and keeps both conversations' metadata in step.

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{info, instrument};
use validator::Validate;

use mirror_cache::{CacheKey, KeyPrefix};
use mirror_core::entities::{ConversationPair, DisplayConfig, MessagePair, MessageType, ResolvedPair};
use mirror_core::traits::MessagePage;
use mirror_core::{DomainError, Snowflake};

use crate::dto::{ConversationResponse, MessageResponse, SendMessageRequest, SendMessageResponse};

use super::context::ServiceContext;
use super::conversation::ConversationMirrorService;
use super::error::{ServiceError, ServiceResult};
use super::parse_id;

/// Message mirror service
pub struct MessageMirrorService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageMirrorService<'a> {
    /// Create a new MessageMirrorService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a message from `sender_id`.
    ///
    /// On first contact the conversation pair is created in the same
    /// transaction as the message pair, so a failed send leaves nothing
    /// behind. Otherwise the message pair and both conversations' metadata
    /// are committed together. Cached views are invalidated afterwards.
    #[instrument(skip(self, request), fields(receiver_id = %request.receiver_id))]
    pub async fn send(
        &self,
        sender_id: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<SendMessageResponse> {
        let content = request.content.trim();
        if content.is_empty() {
            return Err(DomainError::InvalidContent("message content is empty".to_string()).into());
        }
        let message_type = request
            .message_type
            .as_deref()
            .ok_or_else(|| DomainError::InvalidContent("message type is required".to_string()))?
            .parse::<MessageType>()?;

        let receiver_id = parse_id("receiver_id", &request.receiver_id)?;
        if sender_id == receiver_id {
            return Err(DomainError::SelfMessage.into());
        }
        request.validate()?;

        let hint = request
            .conversation_id
            .as_deref()
            .map(|raw| parse_id("conversation_id", raw))
            .transpose()?;

        let draft = Draft {
            content: content.to_string(),
            message_type,
            // Stored at microsecond precision; match it so responses equal later reads
            created_at: Utc::now().trunc_subsecs(6),
        };

        let conversations = ConversationMirrorService::new(self.ctx);
        let (resolved, messages) = match conversations.find_pair(sender_id, receiver_id, hint).await? {
            Some(pair) => self.append(pair, draft).await?,
            None => {
                let display = request.display.map(DisplayConfig::from).unwrap_or_default();
                let pair = ConversationPair::new(self.ctx.generate_pair(), sender_id, receiver_id, display)?;
                let messages = draft.build(self.ctx.generate_pair(), &pair)?;

                match self
                    .ctx
                    .within_write_timeout(self.ctx.message_repo().create_first_pair(&pair, &messages))
                    .await
                {
                    Ok(()) => {
                        info!(
                            origin_id = %pair.origin.id,
                            mirror_id = %pair.mirror.id,
                            "Conversation pair created"
                        );
                        (ResolvedPair::created(pair), messages)
                    }
                    Err(ServiceError::Domain(DomainError::ConversationPairExists { .. })) => {
                        let pair = conversations.after_lost_race(sender_id, receiver_id).await?;
                        self.append(pair, draft).await?
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        let origin_id = resolved.origin.value.id;
        let mirror_id = resolved.mirror.value.id;
        self.ctx
            .cache()
            .invalidate_all([
                KeyPrefix::message_pages(origin_id).into(),
                KeyPrefix::message_pages(mirror_id).into(),
                CacheKey::conversation_list(sender_id).into(),
                CacheKey::conversation_list(receiver_id).into(),
            ])
            .await;

        info!(
            message_id = %messages.sent.id,
            mirror_message_id = %messages.mirrored.id,
            conversation_id = %origin_id,
            "Message pair created"
        );

        let mirror_conversation = resolved.mirror.created.then(|| {
            let mut mirror = resolved.mirror.value;
            mirror.record_message(messages.mirrored.created_at, true);
            ConversationResponse::from(mirror)
        });

        Ok(SendMessageResponse {
            message: MessageResponse::from(&messages.sent),
            mirror_message: MessageResponse::from(&messages.mirrored),
            mirror_conversation,
        })
    }

    /// Add a message pair to a pair that already exists
    async fn append(
        &self,
        pair: ConversationPair,
        draft: Draft,
    ) -> ServiceResult<(ResolvedPair, MessagePair)> {
        let messages = draft.build(self.ctx.generate_pair(), &pair)?;
        self.ctx
            .within_write_timeout(self.ctx.message_repo().create_pair(&messages))
            .await?;
        Ok((ResolvedPair::existing(pair), messages))
    }

    /// Get one page of the owner's conversation, newest first
    #[instrument(skip(self))]
    pub async fn list_messages(
        &self,
        owner_id: Snowflake,
        conversation_id: Snowflake,
        page: u32,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let conversation = ConversationMirrorService::new(self.ctx)
            .find_owned(owner_id, conversation_id)
            .await?;

        let page = MessagePage::new(page, self.ctx.settings().page_size);
        let key = CacheKey::message_page(conversation.id, page.page).name();

        self.ctx
            .cache()
            .read_through(&key, || async {
                let messages = self
                    .ctx
                    .message_repo()
                    .find_page(conversation.id, page)
                    .await?;
                Ok::<_, ServiceError>(messages.iter().map(MessageResponse::from).collect())
            })
            .await
    }
}

/// A validated message not yet bound to a conversation
#[derive(Debug, Clone)]
struct Draft {
    content: String,
    message_type: MessageType,
    created_at: DateTime<Utc>,
}

impl Draft {
    fn build(&self, ids: (Snowflake, Snowflake), pair: &ConversationPair) -> Result<MessagePair, DomainError> {
        MessagePair::new(ids, &pair.origin, self.content.clone(), self.message_type, self.created_at)
    }
}
