//! Path parameter extractors
//!
//! Identifiers travel as decimal strings and are parsed here so a malformed
//! id is a 400 with a clear message instead of a 404.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use mart_core::{FavoriteItemType, Snowflake};
use serde::Deserialize;

use crate::response::ApiError;

fn parse_id(raw: &str, name: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {name} format")))
}

/// The single id segment of routes such as `/listings/:listing_id`
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Snowflake);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        parse_id(&raw, "id").map(IdPath)
    }
}

/// `/favorites/:item_type/:item_id`
#[derive(Debug, Deserialize)]
pub struct FavoritePath {
    pub item_type: String,
    pub item_id: String,
}

impl FavoritePath {
    pub fn item_type(&self) -> Result<FavoriteItemType, ApiError> {
        self.item_type
            .parse()
            .map_err(|_| ApiError::invalid_path(format!("Unknown item type: {}", self.item_type)))
    }

    pub fn item_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.item_id, "item_id")
    }
}
