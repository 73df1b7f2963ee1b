//! Favorite row -> entity

use mart_core::entities::Favorite;
use mart_core::error::DomainError;
use mart_core::value_objects::Snowflake;

use super::parse_column;
use crate::models::FavoriteModel;

impl TryFrom<FavoriteModel> for Favorite {
    type Error = DomainError;

    fn try_from(model: FavoriteModel) -> Result<Self, Self::Error> {
        Ok(Favorite {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            item_id: Snowflake::new(model.item_id),
            item_type: parse_column("item_type", &model.item_type)?,
            listing_id: model.listing_id.map(Snowflake::new),
            created_at: model.created_at,
        })
    }
}
