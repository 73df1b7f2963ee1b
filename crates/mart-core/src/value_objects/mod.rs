//! Value objects - small immutable types shared across the domain

mod actor;
mod slug;
mod snowflake;

pub use actor::Actor;
pub use slug::{random_suffix, slugify, with_suffix};
pub use snowflake::{Snowflake, SnowflakeError, SnowflakeGenerator};
