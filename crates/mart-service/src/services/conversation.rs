//! Conversation service
//!
//! Two-party threads with per-side unread counters and archive flags.
//! Counter changes happen inside the repository transactions; this layer
//! decides who the receiver is and who may look.

use chrono::{DateTime, Utc};
use mart_core::{
    Actor, Conversation, ConversationSide, DomainError, ListingStatus, Message, PageRequest,
    Snowflake,
};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{
    ConversationQuery, ConversationResponse, ConversationStartedResponse,
    CreateConversationRequest, MarkReadResponse, MessageResponse, PageResponse,
    SendMessageRequest, UnreadSummaryResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Open a thread with the opening message, or append to the existing
    /// thread for the same pair and listing
    #[instrument(skip(self, request), fields(sender_id = %actor.id, recipient_id = %request.recipient_id))]
    pub async fn create_conversation(
        &self,
        actor: &Actor,
        request: CreateConversationRequest,
    ) -> ServiceResult<ConversationStartedResponse> {
        request.validate()?;
        let recipient_id = request.recipient_id;
        if actor.is(recipient_id) {
            return Err(DomainError::CannotMessageSelf.into());
        }

        if self.ctx.user_repo().find_by_id(recipient_id).await?.is_none() {
            return Err(DomainError::UserNotFound(recipient_id).into());
        }

        if let Some(listing_id) = request.listing_id {
            let listing = self
                .ctx
                .listing_repo()
                .find_by_id(listing_id)
                .await?
                .ok_or(DomainError::ListingNotFound(listing_id))?;
            if listing.status != ListingStatus::Active {
                return Err(DomainError::ListingNotActive.into());
            }
        }

        let now = Utc::now();
        let repo = self.ctx.conversation_repo();
        if let Some(existing) = repo
            .find_between(actor.id, recipient_id, request.listing_id)
            .await?
        {
            return self.reuse(actor, &existing, recipient_id, request.message, now).await;
        }

        let mut conversation = Conversation::new(
            self.ctx.generate_id(),
            actor.id,
            recipient_id,
            request.listing_id,
            now,
        )?;
        let message = Message::new(
            self.ctx.generate_id(),
            conversation.id,
            actor.id,
            recipient_id,
            request.message.clone(),
            now,
        )?;
        conversation.record_message(&message)?;

        match repo.create(&conversation, &message).await {
            Ok(()) => {}
            // A concurrent opener inserted the thread first
            Err(DomainError::ConversationAlreadyExists) => {
                let existing = repo
                    .find_between(actor.id, recipient_id, request.listing_id)
                    .await?
                    .ok_or(DomainError::ConversationAlreadyExists)?;
                return self.reuse(actor, &existing, recipient_id, request.message, now).await;
            }
            Err(e) => return Err(e.into()),
        }
        info!(conversation_id = %conversation.id, "Conversation created");

        Ok(ConversationStartedResponse {
            conversation: ConversationResponse::for_participant(&conversation, actor.id),
            message: message.into(),
            reused: false,
        })
    }

    async fn reuse(
        &self,
        actor: &Actor,
        existing: &Conversation,
        recipient_id: Snowflake,
        content: String,
        now: DateTime<Utc>,
    ) -> ServiceResult<ConversationStartedResponse> {
        let message = Message::new(
            self.ctx.generate_id(),
            existing.id,
            actor.id,
            recipient_id,
            content,
            now,
        )?;
        let conversation = self.ctx.conversation_repo().append_message(&message).await?;
        info!(conversation_id = %conversation.id, "Existing conversation reused");

        Ok(ConversationStartedResponse {
            conversation: ConversationResponse::for_participant(&conversation, actor.id),
            message: message.into(),
            reused: true,
        })
    }

    #[instrument(skip(self, request), fields(sender_id = %actor.id))]
    pub async fn send_message(
        &self,
        actor: &Actor,
        conversation_id: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        request.validate()?;
        let conversation = self.load(conversation_id).await?;
        let receiver_id = conversation.other_participant(actor.id)?;

        let message = Message::new(
            self.ctx.generate_id(),
            conversation.id,
            actor.id,
            receiver_id,
            request.content,
            Utc::now(),
        )?;
        self.ctx.conversation_repo().append_message(&message).await?;

        info!(conversation_id = %conversation.id, message_id = %message.id, "Message sent");
        Ok(message.into())
    }

    /// Read every message addressed to the caller and zero their counter
    #[instrument(skip(self), fields(user_id = %actor.id))]
    pub async fn mark_as_read(
        &self,
        actor: &Actor,
        conversation_id: Snowflake,
    ) -> ServiceResult<MarkReadResponse> {
        let conversation = self.load(conversation_id).await?;
        conversation.require_side(actor.id)?;

        let messages_read = self
            .ctx
            .conversation_repo()
            .mark_read(conversation_id, actor.id, Utc::now())
            .await?;
        info!(conversation_id = %conversation_id, messages_read, "Conversation marked as read");
        Ok(MarkReadResponse { messages_read })
    }

    #[instrument(skip(self), fields(user_id = %actor.id))]
    pub async fn archive(&self, actor: &Actor, conversation_id: Snowflake) -> ServiceResult<()> {
        self.set_archived(actor, conversation_id, true).await
    }

    #[instrument(skip(self), fields(user_id = %actor.id))]
    pub async fn unarchive(&self, actor: &Actor, conversation_id: Snowflake) -> ServiceResult<()> {
        self.set_archived(actor, conversation_id, false).await
    }

    async fn set_archived(
        &self,
        actor: &Actor,
        conversation_id: Snowflake,
        archived: bool,
    ) -> ServiceResult<()> {
        let conversation = self.load(conversation_id).await?;
        let side: ConversationSide = conversation.require_side(actor.id)?;
        self.ctx
            .conversation_repo()
            .set_archived(conversation_id, side, archived)
            .await?;
        info!(conversation_id = %conversation_id, archived, "Conversation archive flag changed");
        Ok(())
    }

    #[instrument(skip(self, query), fields(user_id = %actor.id))]
    pub async fn list_conversations(
        &self,
        actor: &Actor,
        query: ConversationQuery,
        page: PageRequest,
    ) -> ServiceResult<PageResponse<ConversationResponse>> {
        let conversations = self
            .ctx
            .conversation_repo()
            .list_for_user(actor.id, query.archived, page)
            .await?;
        Ok(PageResponse::from_page(conversations, |c| {
            ConversationResponse::for_participant(&c, actor.id)
        }))
    }

    #[instrument(skip(self), fields(user_id = %actor.id))]
    pub async fn get_conversation(
        &self,
        actor: &Actor,
        conversation_id: Snowflake,
    ) -> ServiceResult<ConversationResponse> {
        let conversation = self.load(conversation_id).await?;
        conversation.require_side(actor.id)?;
        Ok(ConversationResponse::for_participant(&conversation, actor.id))
    }

    /// Newest first
    #[instrument(skip(self), fields(user_id = %actor.id))]
    pub async fn get_messages(
        &self,
        actor: &Actor,
        conversation_id: Snowflake,
        page: PageRequest,
    ) -> ServiceResult<PageResponse<MessageResponse>> {
        let conversation = self.load(conversation_id).await?;
        conversation.require_side(actor.id)?;
        let messages = self
            .ctx
            .conversation_repo()
            .messages(conversation_id, page)
            .await?;
        Ok(PageResponse::from_page(messages, MessageResponse::from))
    }

    #[instrument(skip(self), fields(user_id = %actor.id))]
    pub async fn unread_summary(&self, actor: &Actor) -> ServiceResult<UnreadSummaryResponse> {
        let (total_unread, conversations_with_unread) =
            self.ctx.conversation_repo().unread_summary(actor.id).await?;
        Ok(UnreadSummaryResponse {
            total_unread,
            conversations_with_unread,
        })
    }

    async fn load(&self, conversation_id: Snowflake) -> ServiceResult<Conversation> {
        self.ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| DomainError::ConversationNotFound(conversation_id).into())
    }
}
