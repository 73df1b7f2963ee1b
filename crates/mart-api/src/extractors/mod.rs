//! Axum extractors for request handling
//!
//! Each one rejects with [`ApiError`](crate::response::ApiError), so
//! malformed input gets the same error envelope as handler failures.

mod auth;
mod pagination;
mod path;
mod query;
mod validated;

pub use auth::{AuthUser, OptionalAuthUser};
pub use pagination::{Pagination, PaginationParams};
pub use path::{FavoritePath, IdPath};
pub use query::QueryParams;
pub use validated::{OptionalValidatedJson, ValidatedJson};
