//! Domain entities - core business objects and their state rules

mod category;
mod conversation;
mod favorite;
mod listing;
mod report;
mod user;

pub use category::{build_tree, would_create_cycle, Category, CategoryNode};
pub use conversation::{Conversation, ConversationSide, Message};
pub use favorite::{Favorite, FavoriteItemType};
pub use listing::{
    BoostDuration, Condition, ContactMethod, Currency, Listing, ListingStatus,
    DEFAULT_REJECTION_REASON, LISTING_LIFETIME_DAYS,
};
pub use report::{ListingReport, ReportStatus, ReportUpdate, REPORT_REASONS};
pub use user::{User, UserRole, UserStatus};
