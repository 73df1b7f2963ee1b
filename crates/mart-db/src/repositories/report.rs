//! PostgreSQL implementation of ReportRepository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use mart_core::entities::{ListingReport, ReportStatus, ReportUpdate};
use mart_core::error::DomainError;
use mart_core::traits::{Page, PageRequest, RepoResult, ReportFilter, ReportRepository};
use mart_core::value_objects::Snowflake;

use crate::mappers::status_counts;
use crate::models::{ReportModel, StatusCountModel};

use super::error::{map_db_error, map_rows, map_unique_violation};

const REPORT_COLUMNS: &str = "id, listing_id, reporter_id, reason, additional_info, status, \
    admin_note, last_updated_by, status_updated_at, action_taken, notification_sent, \
    created_at, updated_at";

/// Statuses covered by the one-open-report-per-pair index
const ACTIVE_STATUSES: &str = "('pending', 'reviewed')";

#[derive(Clone)]
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReportFilter) {
    qb.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(listing_id) = filter.listing_id {
        qb.push(" AND listing_id = ").push_bind(listing_id.into_inner());
    }
    if let Some(reporter_id) = filter.reporter_id {
        qb.push(" AND reporter_id = ").push_bind(reporter_id.into_inner());
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ListingReport>> {
        let row = sqlx::query_as::<_, ReportModel>(&format!(
            "SELECT {REPORT_COLUMNS} FROM listing_reports WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(ListingReport::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_active(
        &self,
        listing_id: Snowflake,
        reporter_id: Snowflake,
    ) -> RepoResult<Option<ListingReport>> {
        let row = sqlx::query_as::<_, ReportModel>(&format!(
            r"
            SELECT {REPORT_COLUMNS} FROM listing_reports
            WHERE listing_id = $1 AND reporter_id = $2 AND status IN {ACTIVE_STATUSES}
            LIMIT 1
            "
        ))
        .bind(listing_id.into_inner())
        .bind(reporter_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(ListingReport::try_from).transpose()
    }

    #[instrument(skip(self, report), fields(report_id = %report.id, listing_id = %report.listing_id))]
    async fn create(&self, report: &ListingReport) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO listing_reports (id, listing_id, reporter_id, reason, additional_info,
                                         status, admin_note, last_updated_by, status_updated_at,
                                         action_taken, notification_sent, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(report.id.into_inner())
        .bind(report.listing_id.into_inner())
        .bind(report.reporter_id.into_inner())
        .bind(&report.reason)
        .bind(&report.additional_info)
        .bind(report.status.as_str())
        .bind(&report.admin_note)
        .bind(report.last_updated_by.map(Snowflake::into_inner))
        .bind(report.status_updated_at)
        .bind(&report.action_taken)
        .bind(report.notification_sent)
        .bind(report.created_at)
        .bind(report.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyReported))?;

        Ok(())
    }

    #[instrument(skip(self, report), fields(report_id = %report.id, status = %report.status))]
    async fn update(&self, report: &ListingReport) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE listing_reports
            SET status = $2, admin_note = $3, last_updated_by = $4, status_updated_at = $5,
                action_taken = $6, notification_sent = $7, updated_at = $8
            WHERE id = $1
            ",
        )
        .bind(report.id.into_inner())
        .bind(report.status.as_str())
        .bind(&report.admin_note)
        .bind(report.last_updated_by.map(Snowflake::into_inner))
        .bind(report.status_updated_at)
        .bind(&report.action_taken)
        .bind(report.notification_sent)
        .bind(report.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyReported))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ReportNotFound(report.id));
        }
        Ok(())
    }

    #[instrument(skip(self, update), fields(count = ids.len(), status = %update.status))]
    async fn bulk_update(&self, ids: &[Snowflake], update: &ReportUpdate) -> RepoResult<u64> {
        let ids: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let found: Vec<i64> =
            sqlx::query_scalar::<_, i64>("SELECT id FROM listing_reports WHERE id = ANY($1) FOR UPDATE")
                .bind(&ids)
                .fetch_all(&mut *tx)
                .await
                .map_err(map_db_error)?;

        if found.is_empty() {
            tx.rollback().await.map_err(map_db_error)?;
            return Ok(0);
        }

        let result = sqlx::query(
            r"
            UPDATE listing_reports
            SET status = $2,
                admin_note = COALESCE($3, admin_note),
                action_taken = COALESCE($4, action_taken),
                last_updated_by = $5,
                status_updated_at = $6,
                updated_at = $6
            WHERE id = ANY($1)
            ",
        )
        .bind(&found)
        .bind(update.status.as_str())
        .bind(&update.admin_note)
        .bind(&update.action_taken)
        .bind(update.updated_by.into_inner())
        .bind(update.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyReported))?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self, update), fields(status = %update.status))]
    async fn update_active_for_listing(
        &self,
        listing_id: Snowflake,
        update: &ReportUpdate,
    ) -> RepoResult<u64> {
        let result = sqlx::query(&format!(
            r"
            UPDATE listing_reports
            SET status = $2,
                admin_note = COALESCE($3, admin_note),
                action_taken = COALESCE($4, action_taken),
                last_updated_by = $5,
                status_updated_at = $6,
                updated_at = $6
            WHERE listing_id = $1 AND status IN {ACTIVE_STATUSES}
            "
        ))
        .bind(listing_id.into_inner())
        .bind(update.status.as_str())
        .bind(&update.admin_note)
        .bind(&update.action_taken)
        .bind(update.updated_by.into_inner())
        .bind(update.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &ReportFilter, page: PageRequest) -> RepoResult<Page<ListingReport>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM listing_reports");
        push_filter(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {REPORT_COLUMNS} FROM listing_reports"));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = select
            .build_query_as::<ReportModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(map_rows(rows)?, total, page))
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self) -> RepoResult<Vec<(ReportStatus, i64)>> {
        let rows = sqlx::query_as::<_, StatusCountModel>(
            "SELECT status, COUNT(*) AS count FROM listing_reports GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        status_counts(rows)
    }

    #[instrument(skip(self))]
    async fn top_reasons(&self, limit: i64) -> RepoResult<Vec<(String, i64)>> {
        sqlx::query_as::<_, (String, i64)>(
            r"
            SELECT reason, COUNT(*) AS count
            FROM listing_reports
            GROUP BY reason
            ORDER BY count DESC, reason ASC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn daily_counts(&self, since: DateTime<Utc>) -> RepoResult<Vec<(NaiveDate, i64)>> {
        sqlx::query_as::<_, (NaiveDate, i64)>(
            r"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS count
            FROM listing_reports
            WHERE created_at >= $1
            GROUP BY day
            ORDER BY day ASC
            ",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
