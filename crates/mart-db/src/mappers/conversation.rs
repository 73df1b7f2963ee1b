//! Conversation and message rows -> entities

use mart_core::entities::{Conversation, Message};
use mart_core::value_objects::Snowflake;

use crate::models::{ConversationModel, MessageModel};

impl From<ConversationModel> for Conversation {
    fn from(model: ConversationModel) -> Self {
        Conversation {
            id: Snowflake::new(model.id),
            user1_id: Snowflake::new(model.user1_id),
            user2_id: Snowflake::new(model.user2_id),
            listing_id: model.listing_id.map(Snowflake::new),
            user1_unread_count: model.user1_unread_count,
            user2_unread_count: model.user2_unread_count,
            user1_archived: model.user1_archived,
            user2_archived: model.user2_archived,
            last_message_at: model.last_message_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            conversation_id: Snowflake::new(model.conversation_id),
            sender_id: Snowflake::new(model.sender_id),
            receiver_id: Snowflake::new(model.receiver_id),
            content: model.content,
            is_read: model.is_read,
            read_at: model.read_at,
            created_at: model.created_at,
        }
    }
}
