//! PostgreSQL implementation of CategoryRepository

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::instrument;

use mart_core::entities::Category;
use mart_core::error::DomainError;
use mart_core::traits::{CategoryRepository, RepoResult};
use mart_core::value_objects::Snowflake;

use crate::models::CategoryModel;

use super::error::{map_db_error, map_unique_violation};

const CATEGORY_COLUMNS: &str = "id, name, slug, parent_id, is_active, display_order, \
    translations, attributes, image, icon, created_at, updated_at";

#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryModel>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Category::from))
    }

    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryModel>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Category::from))
    }

    #[instrument(skip(self))]
    async fn slug_exists(&self, slug: &str) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn list(&self, include_inactive: bool) -> RepoResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryModel>(&format!(
            r"
            SELECT {CATEGORY_COLUMNS} FROM categories
            WHERE $1 OR is_active
            ORDER BY display_order ASC, name ASC
            "
        ))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    #[instrument(skip(self))]
    async fn children(&self, parent_id: Snowflake, include_inactive: bool) -> RepoResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryModel>(&format!(
            r"
            SELECT {CATEGORY_COLUMNS} FROM categories
            WHERE parent_id = $1 AND ($2 OR is_active)
            ORDER BY display_order ASC, name ASC
            "
        ))
        .bind(parent_id.into_inner())
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_children(&self, parent_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
            .bind(parent_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, category), fields(category_id = %category.id))]
    async fn create(&self, category: &Category) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO categories (id, name, slug, parent_id, is_active, display_order,
                                    translations, attributes, image, icon, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(category.id.into_inner())
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.parent_id.map(Snowflake::into_inner))
        .bind(category.is_active)
        .bind(category.display_order)
        .bind(Json(&category.translations))
        .bind(Json(&category.attributes))
        .bind(&category.image)
        .bind(&category.icon)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::SlugAlreadyExists(category.slug.clone())))?;

        Ok(())
    }

    #[instrument(skip(self, category), fields(category_id = %category.id))]
    async fn update(&self, category: &Category) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE categories
            SET name = $2, slug = $3, parent_id = $4, is_active = $5, display_order = $6,
                translations = $7, attributes = $8, image = $9, icon = $10, updated_at = $11
            WHERE id = $1
            ",
        )
        .bind(category.id.into_inner())
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.parent_id.map(Snowflake::into_inner))
        .bind(category.is_active)
        .bind(category.display_order)
        .bind(Json(&category.translations))
        .bind(Json(&category.attributes))
        .bind(&category.image)
        .bind(&category.icon)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::SlugAlreadyExists(category.slug.clone())))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::CategoryNotFound(category.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::CategoryNotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgCategoryRepository>();
    }
}
