//! Integration test utilities for the marketplace API
//!
//! Spawns the real server against the PostgreSQL named by `DATABASE_URL` and
//! drives it over HTTP.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
