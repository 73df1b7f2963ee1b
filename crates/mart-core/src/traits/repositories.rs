//! Repository traits (ports) - the data access the engines need
//!
//! The domain layer defines what it needs and the persistence layer
//! provides the implementation. Counters and bulk changes are expressed as
//! dedicated methods so implementations can run them as single relative
//! updates or inside one transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::entities::{
    Category, Conversation, ConversationSide, Favorite, FavoriteItemType, Listing, ListingReport,
    ListingStatus, Message, ReportStatus, ReportUpdate, User,
};
use crate::error::DomainError;
use crate::traits::query::{ListingFilter, ListingSort, Page, PageRequest, ReportFilter, UserFilter};
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Case-insensitive lookup
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Insert a new account. Duplicate email maps to `EmailAlreadyExists`.
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Persist profile, role, status and last login
    async fn update(&self, user: &User) -> RepoResult<()>;

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;

    /// Newest accounts first
    async fn list(&self, filter: &UserFilter, page: PageRequest) -> RepoResult<Page<User>>;

    async fn count(&self) -> RepoResult<i64>;
}

// ============================================================================
// Listing Repository
// ============================================================================

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Listing>>;

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Listing>>;

    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<Listing>>;

    async fn slug_exists(&self, slug: &str) -> RepoResult<bool>;

    /// Duplicate slug maps to `SlugAlreadyExists`
    async fn create(&self, listing: &Listing) -> RepoResult<()>;

    /// Write back every mutable column. Missing rows map to `ListingNotFound`.
    async fn update(&self, listing: &Listing) -> RepoResult<()>;

    /// `views = views + 1`
    async fn increment_views(&self, id: Snowflake) -> RepoResult<()>;

    async fn search(
        &self,
        filter: &ListingFilter,
        sort: ListingSort,
        page: PageRequest,
    ) -> RepoResult<Page<Listing>>;

    /// Active listings whose feature has not elapsed, newest first
    async fn featured(&self, now: DateTime<Utc>, limit: i64) -> RepoResult<Vec<Listing>>;

    async fn count_by_status(&self) -> RepoResult<Vec<(ListingStatus, i64)>>;

    /// Listings of any status filed under the category
    async fn count_in_category(&self, category_id: Snowflake) -> RepoResult<i64>;

    /// Clear `is_featured` where `featured_until` has passed or is unset
    async fn clear_expired_featured(&self, now: DateTime<Utc>) -> RepoResult<u64>;

    /// Clear `is_promoted` where `promotion_end_date` has passed or is unset
    async fn clear_expired_promotions(&self, now: DateTime<Utc>) -> RepoResult<u64>;

    /// Move active listings past their expiry date to `expired`
    async fn expire_elapsed(&self, now: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// Category Repository
// ============================================================================

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Category>>;

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>>;

    async fn slug_exists(&self, slug: &str) -> RepoResult<bool>;

    /// Every category, ordered by display order then name
    async fn list(&self, include_inactive: bool) -> RepoResult<Vec<Category>>;

    async fn children(&self, parent_id: Snowflake, include_inactive: bool) -> RepoResult<Vec<Category>>;

    async fn count_children(&self, parent_id: Snowflake) -> RepoResult<i64>;

    async fn create(&self, category: &Category) -> RepoResult<()>;

    async fn update(&self, category: &Category) -> RepoResult<()>;

    /// Remove the row
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    async fn count(&self) -> RepoResult<i64>;
}

// ============================================================================
// Conversation Repository
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>>;

    /// Thread between the unordered pair `{a, b}` about `listing_id`
    async fn find_between(
        &self,
        a: Snowflake,
        b: Snowflake,
        listing_id: Option<Snowflake>,
    ) -> RepoResult<Option<Conversation>>;

    /// Insert a conversation together with its opening message, atomically.
    /// The conversation already carries the counters for that message.
    /// A thread for the same pair and listing maps to `ConversationAlreadyExists`.
    async fn create(&self, conversation: &Conversation, first_message: &Message) -> RepoResult<()>;

    /// Insert a message and bump the receiver's counter in one transaction.
    /// Both archive flags are cleared. Returns the updated conversation.
    async fn append_message(&self, message: &Message) -> RepoResult<Conversation>;

    /// Flip every unread message addressed to `user_id` to read and zero
    /// that user's counter, atomically. Returns the number of messages read.
    async fn mark_read(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<u64>;

    async fn set_archived(
        &self,
        conversation_id: Snowflake,
        side: ConversationSide,
        archived: bool,
    ) -> RepoResult<()>;

    /// The user's conversations with the given archive state, latest activity first
    async fn list_for_user(
        &self,
        user_id: Snowflake,
        archived: bool,
        page: PageRequest,
    ) -> RepoResult<Page<Conversation>>;

    /// Messages, newest first
    async fn messages(&self, conversation_id: Snowflake, page: PageRequest) -> RepoResult<Page<Message>>;

    /// (total unread for the user, conversations with unread messages)
    async fn unread_summary(&self, user_id: Snowflake) -> RepoResult<(i64, i64)>;
}

// ============================================================================
// Report Repository
// ============================================================================

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ListingReport>>;

    /// The reporter's pending or reviewed report on the listing
    async fn find_active(
        &self,
        listing_id: Snowflake,
        reporter_id: Snowflake,
    ) -> RepoResult<Option<ListingReport>>;

    /// A second active report for the same pair maps to `AlreadyReported`
    async fn create(&self, report: &ListingReport) -> RepoResult<()>;

    async fn update(&self, report: &ListingReport) -> RepoResult<()>;

    /// Apply one decision to many reports in one transaction.
    /// Returns the number of reports updated.
    async fn bulk_update(&self, ids: &[Snowflake], update: &ReportUpdate) -> RepoResult<u64>;

    /// Apply a decision to every active report on a listing
    async fn update_active_for_listing(
        &self,
        listing_id: Snowflake,
        update: &ReportUpdate,
    ) -> RepoResult<u64>;

    /// Newest first
    async fn list(&self, filter: &ReportFilter, page: PageRequest) -> RepoResult<Page<ListingReport>>;

    async fn count_by_status(&self) -> RepoResult<Vec<(ReportStatus, i64)>>;

    /// Most frequent reasons, most frequent first
    async fn top_reasons(&self, limit: i64) -> RepoResult<Vec<(String, i64)>>;

    /// Reports per UTC day created at or after `since`. Days without reports are omitted.
    async fn daily_counts(&self, since: DateTime<Utc>) -> RepoResult<Vec<(NaiveDate, i64)>>;
}

// ============================================================================
// Favorite Repository
// ============================================================================

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn find(
        &self,
        user_id: Snowflake,
        item_type: FavoriteItemType,
        item_id: Snowflake,
    ) -> RepoResult<Option<Favorite>>;

    /// Duplicate maps to `FavoriteAlreadyExists`
    async fn create(&self, favorite: &Favorite) -> RepoResult<()>;

    /// Missing rows map to `FavoriteNotFound`
    async fn delete(
        &self,
        user_id: Snowflake,
        item_type: FavoriteItemType,
        item_id: Snowflake,
    ) -> RepoResult<()>;

    /// Newest first
    async fn list(
        &self,
        user_id: Snowflake,
        item_type: Option<FavoriteItemType>,
        page: PageRequest,
    ) -> RepoResult<Page<Favorite>>;
}
