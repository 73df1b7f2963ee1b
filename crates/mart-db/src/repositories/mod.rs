//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in mart-core.

mod category;
mod conversation;
mod error;
mod favorite;
mod listing;
mod report;
mod user;

pub use category::PgCategoryRepository;
pub use conversation::PgConversationRepository;
pub use favorite::PgFavoriteRepository;
pub use listing::PgListingRepository;
pub use report::PgReportRepository;
pub use user::PgUserRepository;
