//! Repository ports and the query types they accept

mod query;
mod repositories;

pub use query::{
    ListingFilter, ListingSort, Page, PageRequest, ReportFilter, SweepCounts, UserFilter,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use repositories::{
    CategoryRepository, ConversationRepository, FavoriteRepository, ListingRepository,
    ReportRepository, RepoResult, UserRepository,
};
