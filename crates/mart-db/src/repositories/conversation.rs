//! PostgreSQL implementation of ConversationRepository
//!
//! Counter updates are relative (`+ 1`, reset to `0`) so concurrent senders
//! never overwrite each other's increments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use mart_core::entities::{Conversation, ConversationSide, Message};
use mart_core::error::DomainError;
use mart_core::traits::{ConversationRepository, Page, PageRequest, RepoResult};
use mart_core::value_objects::Snowflake;

use crate::models::{ConversationModel, MessageModel};

use super::error::{map_db_error, map_unique_violation};

const CONVERSATION_COLUMNS: &str = "id, user1_id, user2_id, listing_id, user1_unread_count, \
    user2_unread_count, user1_archived, user2_archived, last_message_at, created_at, updated_at";

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_id, receiver_id, content, is_read, read_at, created_at";

#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn archived_column(side: ConversationSide) -> &'static str {
    match side {
        ConversationSide::First => "user1_archived",
        ConversationSide::Second => "user2_archived",
    }
}

const INSERT_MESSAGE: &str = r"
    INSERT INTO messages (id, conversation_id, sender_id, receiver_id, content, is_read, read_at, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
";

fn insert_message(message: &Message) -> sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments> {
    sqlx::query(INSERT_MESSAGE)
        .bind(message.id.into_inner())
        .bind(message.conversation_id.into_inner())
        .bind(message.sender_id.into_inner())
        .bind(message.receiver_id.into_inner())
        .bind(&message.content)
        .bind(message.is_read)
        .bind(message.read_at)
        .bind(message.created_at)
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        let row = sqlx::query_as::<_, ConversationModel>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn find_between(
        &self,
        a: Snowflake,
        b: Snowflake,
        listing_id: Option<Snowflake>,
    ) -> RepoResult<Option<Conversation>> {
        let row = sqlx::query_as::<_, ConversationModel>(&format!(
            r"
            SELECT {CONVERSATION_COLUMNS} FROM conversations
            WHERE ((user1_id = $1 AND user2_id = $2) OR (user1_id = $2 AND user2_id = $1))
              AND listing_id IS NOT DISTINCT FROM $3
            ORDER BY created_at ASC
            LIMIT 1
            "
        ))
        .bind(a.into_inner())
        .bind(b.into_inner())
        .bind(listing_id.map(Snowflake::into_inner))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Conversation::from))
    }

    #[instrument(skip(self, conversation, first_message), fields(conversation_id = %conversation.id))]
    async fn create(&self, conversation: &Conversation, first_message: &Message) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO conversations (id, user1_id, user2_id, listing_id, user1_unread_count,
                                       user2_unread_count, user1_archived, user2_archived,
                                       last_message_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(conversation.id.into_inner())
        .bind(conversation.user1_id.into_inner())
        .bind(conversation.user2_id.into_inner())
        .bind(conversation.listing_id.map(Snowflake::into_inner))
        .bind(conversation.user1_unread_count)
        .bind(conversation.user2_unread_count)
        .bind(conversation.user1_archived)
        .bind(conversation.user2_archived)
        .bind(conversation.last_message_at)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::ConversationAlreadyExists))?;

        insert_message(first_message)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, message), fields(conversation_id = %message.conversation_id, message_id = %message.id))]
    async fn append_message(&self, message: &Message) -> RepoResult<Conversation> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let row = sqlx::query_as::<_, ConversationModel>(&format!(
            r"
            UPDATE conversations
            SET user1_unread_count = user1_unread_count + CASE WHEN user1_id = $2 THEN 1 ELSE 0 END,
                user2_unread_count = user2_unread_count + CASE WHEN user2_id = $2 THEN 1 ELSE 0 END,
                user1_archived = FALSE,
                user2_archived = FALSE,
                last_message_at = $3,
                updated_at = $3
            WHERE id = $1
            RETURNING {CONVERSATION_COLUMNS}
            "
        ))
        .bind(message.conversation_id.into_inner())
        .bind(message.receiver_id.into_inner())
        .bind(message.created_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or(DomainError::ConversationNotFound(message.conversation_id))?;

        insert_message(message)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(Conversation::from(row))
    }

    #[instrument(skip(self))]
    async fn mark_read(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Resetting first takes the row lock, so an append waits until we commit
        let result = sqlx::query(
            r"
            UPDATE conversations
            SET user1_unread_count = CASE WHEN user1_id = $2 THEN 0 ELSE user1_unread_count END,
                user2_unread_count = CASE WHEN user2_id = $2 THEN 0 ELSE user2_unread_count END
            WHERE id = $1
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ConversationNotFound(conversation_id));
        }

        let read = sqlx::query(
            r"
            UPDATE messages
            SET is_read = TRUE, read_at = $3
            WHERE conversation_id = $1 AND receiver_id = $2 AND NOT is_read
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(user_id.into_inner())
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        tx.commit().await.map_err(map_db_error)?;
        Ok(read)
    }

    #[instrument(skip(self))]
    async fn set_archived(
        &self,
        conversation_id: Snowflake,
        side: ConversationSide,
        archived: bool,
    ) -> RepoResult<()> {
        let result = sqlx::query(&format!(
            "UPDATE conversations SET {} = $2 WHERE id = $1",
            archived_column(side)
        ))
        .bind(conversation_id.into_inner())
        .bind(archived)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ConversationNotFound(conversation_id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_for_user(
        &self,
        user_id: Snowflake,
        archived: bool,
        page: PageRequest,
    ) -> RepoResult<Page<Conversation>> {
        const MINE: &str = "(user1_id = $1 AND user1_archived = $2) OR (user2_id = $1 AND user2_archived = $2)";

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM conversations WHERE {MINE}"
        ))
        .bind(user_id.into_inner())
        .bind(archived)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, ConversationModel>(&format!(
            r"
            SELECT {CONVERSATION_COLUMNS} FROM conversations
            WHERE {MINE}
            ORDER BY last_message_at DESC NULLS LAST, id DESC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(user_id.into_inner())
        .bind(archived)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Page::new(
            rows.into_iter().map(Conversation::from).collect(),
            total,
            page,
        ))
    }

    #[instrument(skip(self))]
    async fn messages(&self, conversation_id: Snowflake, page: PageRequest) -> RepoResult<Page<Message>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
            .bind(conversation_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, MessageModel>(&format!(
            r"
            SELECT {MESSAGE_COLUMNS} FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(conversation_id.into_inner())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Page::new(rows.into_iter().map(Message::from).collect(), total, page))
    }

    #[instrument(skip(self))]
    async fn unread_summary(&self, user_id: Snowflake) -> RepoResult<(i64, i64)> {
        sqlx::query_as::<_, (i64, i64)>(
            r"
            WITH mine AS (
                SELECT CASE WHEN user1_id = $1 THEN user1_unread_count ELSE user2_unread_count END AS unread
                FROM conversations
                WHERE user1_id = $1 OR user2_id = $1
            )
            SELECT COALESCE(SUM(unread), 0)::BIGINT, COUNT(*) FILTER (WHERE unread > 0)
            FROM mine
            ",
        )
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
