//! Row to entity mappers
//!
//! Enum columns are stored as text and parsed on the way out; a value the
//! domain does not know surfaces as a database error.

mod category;
mod conversation;
mod favorite;
mod listing;
mod report;
mod user;

use std::str::FromStr;

use mart_core::DomainError;

pub use report::status_counts;

fn parse_column<T>(column: &'static str, value: &str) -> Result<T, DomainError>
where
    T: FromStr,
{
    value
        .parse()
        .map_err(|_| DomainError::DatabaseError(format!("unexpected {column} value '{value}'")))
}
