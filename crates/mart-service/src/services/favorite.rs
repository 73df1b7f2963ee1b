//! Favorite service

use std::collections::HashMap;

use chrono::Utc;
use mart_core::{
    Actor, DomainError, Favorite, FavoriteItemType, Listing, ListingStatus, PageRequest, Snowflake,
};
use tracing::{info, instrument};

use crate::dto::{
    AddFavoriteRequest, FavoriteQuery, FavoriteResponse, FavoriteStatusResponse, PageResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct FavoriteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FavoriteService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request), fields(user_id = %actor.id, item_type = %request.item_type))]
    pub async fn add_favorite(
        &self,
        actor: &Actor,
        request: AddFavoriteRequest,
    ) -> ServiceResult<FavoriteResponse> {
        let listing = match request.item_type {
            FavoriteItemType::Listing => Some(self.load_listing(request.item_id).await?),
            FavoriteItemType::Product => None,
        };

        let favorite = Favorite::new(
            self.ctx.generate_id(),
            actor.id,
            request.item_type,
            request.item_id,
            Utc::now(),
        );
        self.ctx.favorite_repo().create(&favorite).await?;

        info!(favorite_id = %favorite.id, item_id = %favorite.item_id, "Favorite added");
        Ok(FavoriteResponse::new(favorite, listing))
    }

    #[instrument(skip(self), fields(user_id = %actor.id))]
    pub async fn remove_favorite(
        &self,
        actor: &Actor,
        item_type: FavoriteItemType,
        item_id: Snowflake,
    ) -> ServiceResult<()> {
        self.ctx
            .favorite_repo()
            .delete(actor.id, item_type, item_id)
            .await?;
        info!(item_id = %item_id, "Favorite removed");
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %actor.id))]
    pub async fn is_favorite(
        &self,
        actor: &Actor,
        item_type: FavoriteItemType,
        item_id: Snowflake,
    ) -> ServiceResult<FavoriteStatusResponse> {
        let found = self
            .ctx
            .favorite_repo()
            .find(actor.id, item_type, item_id)
            .await?;
        Ok(FavoriteStatusResponse {
            is_favorite: found.is_some(),
        })
    }

    /// Newest first. Listing favorites carry a summary of the listing when
    /// it still exists.
    #[instrument(skip(self, query), fields(user_id = %actor.id))]
    pub async fn list_favorites(
        &self,
        actor: &Actor,
        query: FavoriteQuery,
        page: PageRequest,
    ) -> ServiceResult<PageResponse<FavoriteResponse>> {
        let favorites = self
            .ctx
            .favorite_repo()
            .list(actor.id, query.item_type, page)
            .await?;

        let listing_ids: Vec<Snowflake> = favorites.items.iter().filter_map(|f| f.listing_id).collect();
        let mut listings: HashMap<Snowflake, Listing> = if listing_ids.is_empty() {
            HashMap::new()
        } else {
            self.ctx
                .listing_repo()
                .find_many(&listing_ids)
                .await?
                .into_iter()
                .filter(|l| l.status != ListingStatus::Deleted)
                .map(|l| (l.id, l))
                .collect()
        };

        Ok(PageResponse::from_page(favorites, |favorite| {
            let listing = favorite.listing_id.and_then(|id| listings.remove(&id));
            FavoriteResponse::new(favorite, listing)
        }))
    }

    async fn load_listing(&self, listing_id: Snowflake) -> ServiceResult<Listing> {
        self.ctx
            .listing_repo()
            .find_by_id(listing_id)
            .await?
            .filter(|l| l.status != ListingStatus::Deleted)
            .ok_or_else(|| DomainError::ListingNotFound(listing_id).into())
    }
}
