//! # mart-db
//!
//! PostgreSQL implementations of the repository ports defined in `mart-core`,
//! built on SQLx.
//!
//! - Connection pool management and migrations
//! - Row models with SQLx `FromRow` derives
//! - Row to entity mappers
//! - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mart_db::{create_pool, run_migrations, PgListingRepository, PoolConfig};
//!
//! async fn example(config: &mart_common::DatabaseConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::from(config)).await?;
//!     run_migrations(&pool).await?;
//!     let listings = PgListingRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{
    PgCategoryRepository, PgConversationRepository, PgFavoriteRepository, PgListingRepository,
    PgReportRepository, PgUserRepository,
};
