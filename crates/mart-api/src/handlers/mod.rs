//! Route handlers, one module per resource

pub mod admin;
pub mod auth;
pub mod categories;
pub mod conversations;
pub mod favorites;
pub mod health;
pub mod listings;
pub mod reports;
pub mod users;
