//! Conversation and message database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ConversationModel {
    pub id: i64,
    pub user1_id: i64,
    pub user2_id: i64,
    pub listing_id: Option<i64>,
    pub user1_unread_count: i32,
    pub user2_unread_count: i32,
    pub user1_archived: bool,
    pub user2_archived: bool,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
