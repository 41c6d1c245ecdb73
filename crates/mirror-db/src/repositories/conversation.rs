//! PostgreSQL implementation of ConversationRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};

use mirror_core::entities::{Conversation, ConversationPair};
use mirror_core::error::DomainError;
use mirror_core::traits::{ConversationRepository, RepoResult};
use mirror_core::value_objects::Snowflake;

use crate::mappers::ConversationInsert;
use crate::models::ConversationModel;

use super::error::{conversation_not_found, map_db_error, map_unique_violation};

/// PostgreSQL implementation of ConversationRepository
#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    /// Create a new PgConversationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        conversation: &Conversation,
    ) -> Result<(), sqlx::Error> {
        let insert = ConversationInsert::new(conversation);
        sqlx::query(
            r#"
            INSERT INTO conversations (
                id, owner_id, counterpart_id, mirror_id, unread,
                nickname_owner, nickname_counterpart, color, emoji, background, created_at
            )
            VALUES ($1, $2, $3, $4, FALSE, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(insert.id)
        .bind(insert.owner_id)
        .bind(insert.counterpart_id)
        .bind(insert.mirror_id)
        .bind(insert.nickname_owner)
        .bind(insert.nickname_counterpart)
        .bind(insert.color)
        .bind(insert.emoji)
        .bind(insert.background)
        .bind(conversation.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Insert both sides of a thread inside an open transaction
    pub(super) async fn insert_pair(
        tx: &mut Transaction<'_, Postgres>,
        pair: &ConversationPair,
    ) -> RepoResult<()> {
        // Lower owner first so racing creators collide on the same key
        // instead of deadlocking on opposite rows
        let (first, second) = if pair.origin.owner_id <= pair.mirror.owner_id {
            (&pair.origin, &pair.mirror)
        } else {
            (&pair.mirror, &pair.origin)
        };

        // Mirror FKs are deferred, so both rows can go in before either resolves
        for conversation in [first, second] {
            Self::insert(tx, conversation)
                .await
                .map_err(|e| map_unique_violation(e, || pair_exists(pair)))?;
        }

        Ok(())
    }
}

pub(super) fn pair_exists(pair: &ConversationPair) -> DomainError {
    DomainError::ConversationPairExists {
        owner_id: pair.origin.owner_id,
        counterpart_id: pair.origin.counterpart_id,
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT id, owner_id, counterpart_id, mirror_id, last_message_at, unread,
                   nickname_owner, nickname_counterpart, color, emoji, background, created_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn find_by_participants(
        &self,
        owner_id: Snowflake,
        counterpart_id: Snowflake,
    ) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT id, owner_id, counterpart_id, mirror_id, last_message_at, unread,
                   nickname_owner, nickname_counterpart, color, emoji, background, created_at
            FROM conversations
            WHERE owner_id = $1 AND counterpart_id = $2
            "#,
        )
        .bind(owner_id.into_inner())
        .bind(counterpart_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn find_by_owner(&self, owner_id: Snowflake) -> RepoResult<Vec<Conversation>> {
        let results = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT id, owner_id, counterpart_id, mirror_id, last_message_at, unread,
                   nickname_owner, nickname_counterpart, color, emoji, background, created_at
            FROM conversations
            WHERE owner_id = $1
            ORDER BY last_message_at DESC NULLS LAST, id DESC
            "#,
        )
        .bind(owner_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Conversation::from).collect())
    }

    #[instrument(skip(self, pair), fields(origin_id = %pair.origin.id, mirror_id = %pair.mirror.id))]
    async fn create_pair(&self, pair: &ConversationPair) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        Self::insert_pair(&mut tx, pair).await?;

        tx.commit()
            .await
            .map_err(|e| map_unique_violation(e, || pair_exists(pair)))?;

        info!("Conversation pair created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_unread(&self, id: Snowflake, unread: bool) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET unread = $2
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .bind(unread)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(conversation_not_found(id));
        }

        Ok(())
    }
}
