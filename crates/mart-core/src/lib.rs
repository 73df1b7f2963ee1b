//! # mart-core
//!
//! Domain layer for the Mart classifieds backend: entities, the listing
//! lifecycle rules, value objects, and the repository ports implemented by
//! the persistence layer. Nothing in here touches a database or HTTP stack.

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    build_tree, would_create_cycle, BoostDuration, Category, CategoryNode, Condition,
    ContactMethod, Conversation, ConversationSide, Currency, Favorite, FavoriteItemType, Listing,
    ListingReport, ListingStatus, Message, ReportStatus, ReportUpdate, User, UserRole, UserStatus,
    DEFAULT_REJECTION_REASON, LISTING_LIFETIME_DAYS, REPORT_REASONS,
};
pub use error::DomainError;
pub use traits::{
    CategoryRepository, ConversationRepository, FavoriteRepository, ListingFilter,
    ListingRepository, ListingSort, Page, PageRequest, ReportFilter, ReportRepository,
    RepoResult, SweepCounts, UserFilter, UserRepository,
};
pub use value_objects::{slugify, Actor, Snowflake, SnowflakeError, SnowflakeGenerator};
