//! PostgreSQL implementation of FavoriteRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use mart_core::entities::{Favorite, FavoriteItemType};
use mart_core::error::DomainError;
use mart_core::traits::{FavoriteRepository, Page, PageRequest, RepoResult};
use mart_core::value_objects::Snowflake;

use crate::models::FavoriteModel;

use super::error::{map_db_error, map_rows, map_unique_violation};

const FAVORITE_COLUMNS: &str = "id, user_id, item_id, item_type, listing_id, created_at";

#[derive(Clone)]
pub struct PgFavoriteRepository {
    pool: PgPool,
}

impl PgFavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for PgFavoriteRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        user_id: Snowflake,
        item_type: FavoriteItemType,
        item_id: Snowflake,
    ) -> RepoResult<Option<Favorite>> {
        let row = sqlx::query_as::<_, FavoriteModel>(&format!(
            r"
            SELECT {FAVORITE_COLUMNS} FROM favorites
            WHERE user_id = $1 AND item_type = $2 AND item_id = $3
            "
        ))
        .bind(user_id.into_inner())
        .bind(item_type.as_str())
        .bind(item_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(Favorite::try_from).transpose()
    }

    #[instrument(skip(self, favorite), fields(user_id = %favorite.user_id, item_id = %favorite.item_id))]
    async fn create(&self, favorite: &Favorite) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO favorites (id, user_id, item_id, item_type, listing_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(favorite.id.into_inner())
        .bind(favorite.user_id.into_inner())
        .bind(favorite.item_id.into_inner())
        .bind(favorite.item_type.as_str())
        .bind(favorite.listing_id.map(Snowflake::into_inner))
        .bind(favorite.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::FavoriteAlreadyExists))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        user_id: Snowflake,
        item_type: FavoriteItemType,
        item_id: Snowflake,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            "DELETE FROM favorites WHERE user_id = $1 AND item_type = $2 AND item_id = $3",
        )
        .bind(user_id.into_inner())
        .bind(item_type.as_str())
        .bind(item_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::FavoriteNotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        user_id: Snowflake,
        item_type: Option<FavoriteItemType>,
        page: PageRequest,
    ) -> RepoResult<Page<Favorite>> {
        let item_type = item_type.map(|t| t.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM favorites WHERE user_id = $1 AND ($2::TEXT IS NULL OR item_type = $2)",
        )
        .bind(user_id.into_inner())
        .bind(item_type)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, FavoriteModel>(&format!(
            r"
            SELECT {FAVORITE_COLUMNS} FROM favorites
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR item_type = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(user_id.into_inner())
        .bind(item_type)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Page::new(map_rows(rows)?, total, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgFavoriteRepository>();
    }
}
