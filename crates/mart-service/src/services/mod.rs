//! Business logic services
//!
//! Each service borrows the [`ServiceContext`] for the duration of one
//! request and orchestrates domain rules over the repository ports.

pub mod admin;
pub mod auth;
pub mod category;
pub mod context;
pub mod conversation;
pub mod error;
pub mod favorite;
pub mod import;
pub mod listing;
pub mod report;
pub mod user;

pub use admin::AdminService;
pub use auth::AuthService;
pub use category::CategoryService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use conversation::ConversationService;
pub use error::{ServiceError, ServiceResult};
pub use favorite::FavoriteService;
pub use import::ImportService;
pub use listing::ListingService;
pub use report::{ReportService, LISTING_REMOVED_ACTION};
pub use user::UserService;

use mart_core::{Actor, DomainError};

/// Gate for the admin console operations
pub(crate) fn require_admin(actor: &Actor) -> Result<(), DomainError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::forbidden("Admin access required"))
    }
}
