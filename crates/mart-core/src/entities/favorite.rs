//! Favorites - bookmarked items per user

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteItemType {
    Product,
    Listing,
}

impl FavoriteItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Listing => "listing",
        }
    }
}

impl FromStr for FavoriteItemType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(Self::Product),
            "listing" => Ok(Self::Listing),
            other => Err(DomainError::validation(format!("Invalid item type: {other}"))),
        }
    }
}

impl fmt::Display for FavoriteItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub item_id: Snowflake,
    pub item_type: FavoriteItemType,
    /// Mirrors `item_id` for listing favorites
    pub listing_id: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    pub fn new(
        id: Snowflake,
        user_id: Snowflake,
        item_type: FavoriteItemType,
        item_id: Snowflake,
        now: DateTime<Utc>,
    ) -> Self {
        let listing_id = (item_type == FavoriteItemType::Listing).then_some(item_id);
        Self {
            id,
            user_id,
            item_id,
            item_type,
            listing_id,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_favorite_mirrors_item_id() {
        let f = Favorite::new(
            Snowflake::new(1),
            Snowflake::new(2),
            FavoriteItemType::Listing,
            Snowflake::new(3),
            Utc::now(),
        );
        assert_eq!(f.listing_id, Some(Snowflake::new(3)));

        let p = Favorite::new(
            Snowflake::new(1),
            Snowflake::new(2),
            FavoriteItemType::Product,
            Snowflake::new(3),
            Utc::now(),
        );
        assert_eq!(p.listing_id, None);
    }
}
