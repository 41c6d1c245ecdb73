//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};

use mirror_core::entities::{ConversationPair, Message, MessagePair};
use mirror_core::traits::{MessagePage, MessageRepository, RepoResult};
use mirror_core::value_objects::{ReactionEmoji, Snowflake};

use crate::mappers::MessageInsert;
use crate::models::MessageModel;

use super::conversation::{pair_exists, PgConversationRepository};
use super::error::{conversation_not_found, map_db_error, map_unique_violation, mismatched_mirror};

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(tx: &mut Transaction<'_, Postgres>, message: &Message) -> RepoResult<()> {
        let insert = MessageInsert::new(message);
        sqlx::query(
            r#"
            INSERT INTO messages (
                id, conversation_id, sender_id, receiver_id, content,
                message_type, mirror_message_id, reaction, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(insert.id)
        .bind(insert.conversation_id)
        .bind(insert.sender_id)
        .bind(insert.receiver_id)
        .bind(insert.content)
        .bind(insert.message_type)
        .bind(insert.mirror_message_id)
        .bind(insert.reaction)
        .bind(message.created_at)
        .execute(&mut **tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn touch_conversation(
        tx: &mut Transaction<'_, Postgres>,
        conversation_id: Snowflake,
        at: DateTime<Utc>,
        unread: bool,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_at = $2, unread = $3
            WHERE id = $1
            "#,
        )
        .bind(conversation_id.into_inner())
        .bind(at)
        .bind(unread)
        .execute(&mut **tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(conversation_not_found(conversation_id));
        }

        Ok(())
    }

    /// Both copies plus the metadata of both conversations
    async fn write_pair(tx: &mut Transaction<'_, Postgres>, pair: &MessagePair) -> RepoResult<()> {
        let at = pair.sent.created_at;

        Self::insert(tx, &pair.sent).await?;
        Self::insert(tx, &pair.mirrored).await?;
        Self::touch_conversation(tx, pair.sent.conversation_id, at, false).await?;
        Self::touch_conversation(tx, pair.mirrored.conversation_id, at, true).await?;

        Ok(())
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT id, conversation_id, sender_id, receiver_id, content,
                   message_type, mirror_message_id, reaction, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Message::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_page(
        &self,
        conversation_id: Snowflake,
        page: MessagePage,
    ) -> RepoResult<Vec<Message>> {
        let results = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT id, conversation_id, sender_id, receiver_id, content,
                   message_type, mirror_message_id, reaction, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(conversation_id.into_inner())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Message::try_from).collect()
    }

    #[instrument(skip(self, pair), fields(message_id = %pair.sent.id, mirror_message_id = %pair.mirrored.id))]
    async fn create_pair(&self, pair: &MessagePair) -> RepoResult<()> {
        // Any early return drops the transaction, which rolls it back
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        Self::write_pair(&mut tx, pair).await?;

        tx.commit().await.map_err(map_db_error)?;

        info!("Message pair created");
        Ok(())
    }

    #[instrument(
        skip(self, conversations, messages),
        fields(conversation_id = %conversations.origin.id, message_id = %messages.sent.id)
    )]
    async fn create_first_pair(
        &self,
        conversations: &ConversationPair,
        messages: &MessagePair,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        PgConversationRepository::insert_pair(&mut tx, conversations).await?;
        Self::write_pair(&mut tx, messages).await?;

        tx.commit()
            .await
            .map_err(|e| map_unique_violation(e, || pair_exists(conversations)))?;

        info!("Conversation pair created with its first message");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_reaction_pair(
        &self,
        message_id: Snowflake,
        mirror_message_id: Snowflake,
        reaction: Option<ReactionEmoji>,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Only rows that point at each other are touched
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET reaction = $3
            WHERE (id = $1 AND mirror_message_id = $2)
               OR (id = $2 AND mirror_message_id = $1)
            "#,
        )
        .bind(message_id.into_inner())
        .bind(mirror_message_id.into_inner())
        .bind(reaction.map(ReactionEmoji::as_str))
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() != 2 {
            tx.rollback().await.map_err(map_db_error)?;
            return Err(mismatched_mirror(message_id, mirror_message_id));
        }

        tx.commit().await.map_err(map_db_error)?;

        info!("Reaction set on message pair");
        Ok(())
    }
}
