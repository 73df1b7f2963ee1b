//! Database models - SQLx row structs for the PostgreSQL tables

mod category;
mod conversation;
mod favorite;
mod listing;
mod report;
mod user;

pub use category::CategoryModel;
pub use conversation::{ConversationModel, MessageModel};
pub use favorite::FavoriteModel;
pub use listing::ListingModel;
pub use report::{ReportModel, StatusCountModel};
pub use user::UserModel;
