//! PostgreSQL implementation of ListingRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use mart_core::entities::{Listing, ListingStatus};
use mart_core::error::DomainError;
use mart_core::traits::{ListingFilter, ListingRepository, ListingSort, Page, PageRequest, RepoResult};
use mart_core::value_objects::Snowflake;

use crate::mappers::status_counts;
use crate::models::{ListingModel, StatusCountModel};

use super::error::{map_db_error, map_rows, map_unique_violation};

#[derive(Clone)]
pub struct PgListingRepository {
    pool: PgPool,
}

impl PgListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn order_by(sort: ListingSort) -> &'static str {
    match sort {
        ListingSort::Newest => {
            " ORDER BY COALESCE(is_featured AND featured_until >= NOW(), FALSE) DESC, \
             created_at DESC, id DESC"
        }
        ListingSort::Oldest => " ORDER BY created_at ASC, id ASC",
        ListingSort::PriceAsc => " ORDER BY price ASC, id DESC",
        ListingSort::PriceDesc => " ORDER BY price DESC, id DESC",
        ListingSort::MostViewed => " ORDER BY views DESC, id DESC",
    }
}

/// `%text%` for ILIKE, with the pattern metacharacters taken literally
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a ListingFilter) {
    if filter.statuses.is_empty() {
        qb.push(" WHERE status <> ").push_bind(ListingStatus::Deleted.as_str());
    } else {
        let statuses: Vec<&'static str> = filter.statuses.iter().map(ListingStatus::as_str).collect();
        qb.push(" WHERE status = ANY(").push_bind(statuses).push(")");
    }

    if let Some(q) = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = like_pattern(q);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND category_id = ").push_bind(category_id.into_inner());
    }
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id.into_inner());
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
    if let Some(currency) = filter.currency {
        qb.push(" AND currency = ").push_bind(currency.as_str());
    }
    if let Some(condition) = filter.condition {
        qb.push(" AND condition = ").push_bind(condition.as_str());
    }
    if let Some(location) = filter.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        qb.push(" AND location ILIKE ")
            .push_bind(like_pattern(location))
            .push(" ESCAPE '\\'");
    }
    if let Some(featured) = filter.is_featured {
        qb.push(" AND is_featured = ").push_bind(featured);
    }
    if let Some(promoted) = filter.is_promoted {
        qb.push(" AND is_promoted = ").push_bind(promoted);
    }
}

#[async_trait]
impl ListingRepository for PgListingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Listing>> {
        let row = sqlx::query_as::<_, ListingModel>(&format!(
            "SELECT {} FROM listings WHERE id = $1",
            ListingModel::COLUMNS
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(Listing::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Listing>> {
        let row = sqlx::query_as::<_, ListingModel>(&format!(
            "SELECT {} FROM listings WHERE slug = $1",
            ListingModel::COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(Listing::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();
        let rows = sqlx::query_as::<_, ListingModel>(&format!(
            "SELECT {} FROM listings WHERE id = ANY($1)",
            ListingModel::COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_rows(rows)
    }

    #[instrument(skip(self))]
    async fn slug_exists(&self, slug: &str) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM listings WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, listing), fields(listing_id = %listing.id))]
    async fn create(&self, listing: &Listing) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO listings (
                id, user_id, category_id, title, slug, description, price, currency, condition,
                location, images, featured_image, status, is_promoted, promotion_end_date,
                is_featured, featured_until, views, contact_phone, contact_email, contact_method,
                rejection_reason, expiry_date, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, $21, $22, $23, $24, $25)
            ",
        )
        .bind(listing.id.into_inner())
        .bind(listing.user_id.into_inner())
        .bind(listing.category_id.map(Snowflake::into_inner))
        .bind(&listing.title)
        .bind(&listing.slug)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(listing.currency.as_str())
        .bind(listing.condition.as_str())
        .bind(&listing.location)
        .bind(&listing.images)
        .bind(&listing.featured_image)
        .bind(listing.status.as_str())
        .bind(listing.is_promoted)
        .bind(listing.promotion_end_date)
        .bind(listing.is_featured)
        .bind(listing.featured_until)
        .bind(listing.views)
        .bind(&listing.contact_phone)
        .bind(&listing.contact_email)
        .bind(listing.contact_method.as_str())
        .bind(&listing.rejection_reason)
        .bind(listing.expiry_date)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::SlugAlreadyExists(listing.slug.clone())))?;

        Ok(())
    }

    #[instrument(skip(self, listing), fields(listing_id = %listing.id, status = %listing.status))]
    async fn update(&self, listing: &Listing) -> RepoResult<()> {
        // views is owned by increment_views and never written back
        let result = sqlx::query(
            r"
            UPDATE listings
            SET category_id = $2, title = $3, slug = $4, description = $5, price = $6,
                currency = $7, condition = $8, location = $9, images = $10,
                featured_image = $11, status = $12, is_promoted = $13,
                promotion_end_date = $14, is_featured = $15, featured_until = $16,
                contact_phone = $17, contact_email = $18, contact_method = $19,
                rejection_reason = $20, expiry_date = $21, updated_at = $22
            WHERE id = $1
            ",
        )
        .bind(listing.id.into_inner())
        .bind(listing.category_id.map(Snowflake::into_inner))
        .bind(&listing.title)
        .bind(&listing.slug)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(listing.currency.as_str())
        .bind(listing.condition.as_str())
        .bind(&listing.location)
        .bind(&listing.images)
        .bind(&listing.featured_image)
        .bind(listing.status.as_str())
        .bind(listing.is_promoted)
        .bind(listing.promotion_end_date)
        .bind(listing.is_featured)
        .bind(listing.featured_until)
        .bind(&listing.contact_phone)
        .bind(&listing.contact_email)
        .bind(listing.contact_method.as_str())
        .bind(&listing.rejection_reason)
        .bind(listing.expiry_date)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::SlugAlreadyExists(listing.slug.clone())))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ListingNotFound(listing.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn increment_views(&self, id: Snowflake) -> RepoResult<()> {
        sqlx::query("UPDATE listings SET views = views + 1 WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        filter: &ListingFilter,
        sort: ListingSort,
        page: PageRequest,
    ) -> RepoResult<Page<Listing>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM listings");
        push_filter(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM listings", ListingModel::COLUMNS));
        push_filter(&mut select, filter);
        select
            .push(order_by(sort))
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = select
            .build_query_as::<ListingModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(map_rows(rows)?, total, page))
    }

    #[instrument(skip(self))]
    async fn featured(&self, now: DateTime<Utc>, limit: i64) -> RepoResult<Vec<Listing>> {
        let rows = sqlx::query_as::<_, ListingModel>(&format!(
            r"
            SELECT {} FROM listings
            WHERE status = 'active' AND is_featured AND featured_until >= $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
            ListingModel::COLUMNS
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_rows(rows)
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self) -> RepoResult<Vec<(ListingStatus, i64)>> {
        let rows = sqlx::query_as::<_, StatusCountModel>(
            "SELECT status, COUNT(*) AS count FROM listings GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        status_counts(rows)
    }

    #[instrument(skip(self))]
    async fn count_in_category(&self, category_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM listings WHERE category_id = $1")
            .bind(category_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn clear_expired_featured(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE listings
            SET is_featured = FALSE, updated_at = $1
            WHERE is_featured AND (featured_until IS NULL OR featured_until < $1)
            ",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn clear_expired_promotions(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE listings
            SET is_promoted = FALSE, updated_at = $1
            WHERE is_promoted AND (promotion_end_date IS NULL OR promotion_end_date < $1)
            ",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn expire_elapsed(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE listings
            SET status = 'expired', updated_at = $1
            WHERE status = 'active' AND expiry_date < $1
            ",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgListingRepository>();
    }

    #[test]
    fn default_filter_excludes_deleted() {
        let filter = ListingFilter::default();
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM listings");
        push_filter(&mut qb, &filter);
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM listings WHERE status <> $1");
    }

    #[test]
    fn public_filter_with_text() {
        let filter = ListingFilter {
            query: Some("bicycle".into()),
            is_featured: Some(true),
            ..ListingFilter::public()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM listings");
        push_filter(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM listings WHERE status = ANY($1) AND (title ILIKE $2 ESCAPE '\\' OR description ILIKE $3 ESCAPE '\\') AND is_featured = $4"
        );
    }

    #[test]
    fn newest_sort_only_ranks_running_features() {
        assert!(order_by(ListingSort::Newest)
            .starts_with(" ORDER BY COALESCE(is_featured AND featured_until >= NOW(), FALSE) DESC"));
    }

    #[test]
    fn like_metacharacters_are_literal() {
        assert_eq!(like_pattern("bike"), "%bike%");
        assert_eq!(like_pattern("_"), "%\\_%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
