//! Conversation and Message entities - two-party threads with per-side
//! unread counters and archive flags

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Which column pair of a conversation belongs to a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationSide {
    First,
    Second,
}

impl ConversationSide {
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: Snowflake,
    pub user1_id: Snowflake,
    pub user2_id: Snowflake,
    pub listing_id: Option<Snowflake>,
    pub user1_unread_count: i32,
    pub user2_unread_count: i32,
    pub user1_archived: bool,
    pub user2_archived: bool,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Empty conversation started by `user1_id`
    pub fn new(
        id: Snowflake,
        user1_id: Snowflake,
        user2_id: Snowflake,
        listing_id: Option<Snowflake>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if user1_id == user2_id {
            return Err(DomainError::CannotMessageSelf);
        }
        Ok(Self {
            id,
            user1_id,
            user2_id,
            listing_id,
            user1_unread_count: 0,
            user2_unread_count: 0,
            user1_archived: false,
            user2_archived: false,
            last_message_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn side_of(&self, user_id: Snowflake) -> Option<ConversationSide> {
        if user_id == self.user1_id {
            Some(ConversationSide::First)
        } else if user_id == self.user2_id {
            Some(ConversationSide::Second)
        } else {
            None
        }
    }

    pub fn require_side(&self, user_id: Snowflake) -> Result<ConversationSide, DomainError> {
        self.side_of(user_id).ok_or(DomainError::NotParticipant)
    }

    #[inline]
    pub fn is_participant(&self, user_id: Snowflake) -> bool {
        self.side_of(user_id).is_some()
    }

    pub fn participant(&self, side: ConversationSide) -> Snowflake {
        match side {
            ConversationSide::First => self.user1_id,
            ConversationSide::Second => self.user2_id,
        }
    }

    /// The participant who is not `user_id`
    pub fn other_participant(&self, user_id: Snowflake) -> Result<Snowflake, DomainError> {
        let side = self.require_side(user_id)?;
        Ok(self.participant(side.other()))
    }

    /// Whether this thread joins the unordered pair `{a, b}` about `listing_id`
    pub fn connects(&self, a: Snowflake, b: Snowflake, listing_id: Option<Snowflake>) -> bool {
        let pair = (self.user1_id == a && self.user2_id == b)
            || (self.user1_id == b && self.user2_id == a);
        pair && self.listing_id == listing_id
    }

    pub fn unread_for(&self, side: ConversationSide) -> i32 {
        match side {
            ConversationSide::First => self.user1_unread_count,
            ConversationSide::Second => self.user2_unread_count,
        }
    }

    pub fn is_archived_for(&self, side: ConversationSide) -> bool {
        match side {
            ConversationSide::First => self.user1_archived,
            ConversationSide::Second => self.user2_archived,
        }
    }

    /// Account for a newly appended message: the receiver's counter goes up
    /// by one and the thread is unarchived on both sides.
    pub fn record_message(&mut self, message: &Message) -> Result<(), DomainError> {
        match self.require_side(message.receiver_id)? {
            ConversationSide::First => self.user1_unread_count += 1,
            ConversationSide::Second => self.user2_unread_count += 1,
        }
        self.user1_archived = false;
        self.user2_archived = false;
        self.last_message_at = Some(message.created_at);
        self.updated_at = message.created_at;
        Ok(())
    }

    pub fn reset_unread(&mut self, side: ConversationSide) {
        match side {
            ConversationSide::First => self.user1_unread_count = 0,
            ConversationSide::Second => self.user2_unread_count = 0,
        }
    }

    pub fn set_archived(&mut self, side: ConversationSide, archived: bool) {
        match side {
            ConversationSide::First => self.user1_archived = archived,
            ConversationSide::Second => self.user2_archived = archived,
        }
    }
}

/// A single message; only the read flag ever changes after creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub receiver_id: Snowflake,
    pub content: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        id: Snowflake,
        conversation_id: Snowflake,
        sender_id: Snowflake,
        receiver_id: Snowflake,
        content: String,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(DomainError::validation("Message content cannot be empty"));
        }
        Ok(Self {
            id,
            conversation_id,
            sender_id,
            receiver_id,
            content,
            is_read: false,
            read_at: None,
            created_at: now,
        })
    }

    pub fn mark_read(&mut self, at: DateTime<Utc>) {
        if !self.is_read {
            self.is_read = true;
            self.read_at = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELLER: Snowflake = Snowflake::new(10);
    const BUYER: Snowflake = Snowflake::new(20);

    fn thread() -> Conversation {
        Conversation::new(Snowflake::new(1), BUYER, SELLER, Some(Snowflake::new(5)), Utc::now())
            .unwrap()
    }

    fn message(from: Snowflake, to: Snowflake) -> Message {
        Message::new(Snowflake::new(2), Snowflake::new(1), from, to, "Is this available?".into(), Utc::now())
            .unwrap()
    }

    #[test]
    fn self_conversation_rejected() {
        assert!(matches!(
            Conversation::new(Snowflake::new(1), BUYER, BUYER, None, Utc::now()),
            Err(DomainError::CannotMessageSelf)
        ));
    }

    #[test]
    fn message_bumps_receiver_only() {
        let mut c = thread();
        c.record_message(&message(BUYER, SELLER)).unwrap();
        assert_eq!(c.unread_for(ConversationSide::Second), 1);
        assert_eq!(c.unread_for(ConversationSide::First), 0);
        assert!(c.last_message_at.is_some());
    }

    #[test]
    fn message_clears_archive_on_both_sides() {
        let mut c = thread();
        c.set_archived(ConversationSide::First, true);
        c.set_archived(ConversationSide::Second, true);
        c.record_message(&message(SELLER, BUYER)).unwrap();
        assert!(!c.is_archived_for(ConversationSide::First));
        assert!(!c.is_archived_for(ConversationSide::Second));
    }

    #[test]
    fn outsider_is_not_participant() {
        let c = thread();
        let outsider = Snowflake::new(99);
        assert!(matches!(c.require_side(outsider), Err(DomainError::NotParticipant)));
        assert_eq!(c.other_participant(BUYER).unwrap(), SELLER);
    }

    #[test]
    fn pair_matching_is_unordered() {
        let c = thread();
        assert!(c.connects(SELLER, BUYER, Some(Snowflake::new(5))));
        assert!(c.connects(BUYER, SELLER, Some(Snowflake::new(5))));
        assert!(!c.connects(BUYER, SELLER, None));
    }

    #[test]
    fn blank_message_rejected() {
        assert!(Message::new(Snowflake::new(1), Snowflake::new(1), BUYER, SELLER, "  ".into(), Utc::now())
            .unwrap_err()
            .is_validation());
    }
}
