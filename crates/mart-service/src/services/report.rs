//! Report service
//!
//! User flags against listings and the admin moderation console. Report
//! status is tracked independently of the listing; the only coordinated
//! effect is [`ReportService::take_down_listing`].

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, Utc};
use mart_core::{
    Actor, DomainError, ListingReport, ListingStatus, PageRequest, ReportFilter, ReportStatus,
    ReportUpdate, Snowflake, REPORT_REASONS,
};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{
    BulkUpdateReportsRequest, BulkUpdateResponse, CreateReportRequest, DailyCount, PageResponse,
    ReasonCount, ReportQuery, ReportReasonsResponse, ReportResponse, ReportStatsResponse,
    TakeDownRequest, TakeDownResponse, UpdateReportRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::require_admin;

/// Recorded on reports closed by a take-down
pub const LISTING_REMOVED_ACTION: &str = "listing_removed";

const STATS_DAYS: i64 = 7;
const TOP_REASONS: i64 = 5;

pub struct ReportService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReportService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// File a report. One active report per reporter and listing.
    #[instrument(skip(self, request), fields(reporter_id = %actor.id))]
    pub async fn submit_report(
        &self,
        actor: &Actor,
        listing_id: Snowflake,
        request: CreateReportRequest,
    ) -> ServiceResult<ReportResponse> {
        request.validate()?;
        let listing = self
            .ctx
            .listing_repo()
            .find_by_id(listing_id)
            .await?
            .filter(|l| l.status != ListingStatus::Deleted)
            .ok_or(DomainError::ListingNotFound(listing_id))?;

        if listing.is_owned_by(actor.id) {
            return Err(DomainError::validation("You cannot report your own listing").into());
        }

        if self
            .ctx
            .report_repo()
            .find_active(listing_id, actor.id)
            .await?
            .is_some()
        {
            warn!(listing_id = %listing_id, "Duplicate report refused");
            return Err(DomainError::AlreadyReported.into());
        }

        let report = ListingReport::new(
            self.ctx.generate_id(),
            listing_id,
            actor.id,
            request.reason,
            request.additional_info,
            Utc::now(),
        )?;
        self.ctx.report_repo().create(&report).await?;

        info!(report_id = %report.id, listing_id = %listing_id, "Report submitted");
        Ok(report.into())
    }

    #[instrument(skip(self))]
    pub async fn my_reports(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> ServiceResult<PageResponse<ReportResponse>> {
        let filter = ReportFilter {
            reporter_id: Some(actor.id),
            ..ReportFilter::default()
        };
        let reports = self.ctx.report_repo().list(&filter, page).await?;
        Ok(PageResponse::from_page(reports, ReportResponse::from))
    }

    pub fn reasons(&self) -> ReportReasonsResponse {
        ReportReasonsResponse {
            reasons: REPORT_REASONS.to_vec(),
        }
    }

    // ------------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------------

    #[instrument(skip(self, query), fields(admin_id = %actor.id))]
    pub async fn list_reports(
        &self,
        actor: &Actor,
        query: ReportQuery,
        page: PageRequest,
    ) -> ServiceResult<PageResponse<ReportResponse>> {
        require_admin(actor)?;
        let filter = ReportFilter {
            status: query.status,
            listing_id: query.listing_id,
            reporter_id: query.reporter_id,
        };
        let reports = self.ctx.report_repo().list(&filter, page).await?;
        Ok(PageResponse::from_page(reports, ReportResponse::from))
    }

    #[instrument(skip(self), fields(admin_id = %actor.id))]
    pub async fn get_report(&self, actor: &Actor, report_id: Snowflake) -> ServiceResult<ReportResponse> {
        require_admin(actor)?;
        Ok(self.load(report_id).await?.into())
    }

    /// Stamps the deciding admin and time. Never touches the listing.
    #[instrument(skip(self, request), fields(admin_id = %actor.id, status = %request.status))]
    pub async fn update_report_status(
        &self,
        actor: &Actor,
        report_id: Snowflake,
        request: UpdateReportRequest,
    ) -> ServiceResult<ReportResponse> {
        require_admin(actor)?;
        request.validate()?;
        let mut report = self.load(report_id).await?;

        ReportUpdate {
            status: request.status,
            admin_note: request.admin_note,
            action_taken: request.action_taken,
            updated_by: actor.id,
            updated_at: Utc::now(),
        }
        .apply(&mut report);

        self.ctx.report_repo().update(&report).await?;
        info!(report_id = %report.id, status = %report.status, "Report status updated");
        Ok(report.into())
    }

    /// One decision for many reports, in one transaction. Unknown ids are
    /// skipped; it fails only when none match.
    #[instrument(skip(self, request), fields(admin_id = %actor.id, count = request.ids.len()))]
    pub async fn bulk_update_report_status(
        &self,
        actor: &Actor,
        request: BulkUpdateReportsRequest,
    ) -> ServiceResult<BulkUpdateResponse> {
        require_admin(actor)?;
        request.validate()?;

        let mut ids = request.ids;
        ids.sort_unstable();
        ids.dedup();

        let update = ReportUpdate {
            status: request.status,
            admin_note: request.admin_note,
            action_taken: request.action_taken,
            updated_by: actor.id,
            updated_at: Utc::now(),
        };
        let updated = self.ctx.report_repo().bulk_update(&ids, &update).await?;
        if updated == 0 {
            return Err(ServiceError::not_found("Report", "none of the given ids"));
        }

        info!(updated, status = %update.status, "Reports updated in bulk");
        Ok(BulkUpdateResponse { updated })
    }

    /// Soft delete the listing, then mark its active reports reviewed.
    /// An already deleted listing still gets its reports closed.
    #[instrument(skip(self, request), fields(admin_id = %actor.id))]
    pub async fn take_down_listing(
        &self,
        actor: &Actor,
        listing_id: Snowflake,
        request: TakeDownRequest,
    ) -> ServiceResult<TakeDownResponse> {
        require_admin(actor)?;
        request.validate()?;
        let now = Utc::now();

        let mut listing = self
            .ctx
            .listing_repo()
            .find_by_id(listing_id)
            .await?
            .ok_or(DomainError::ListingNotFound(listing_id))?;
        if listing.status != ListingStatus::Deleted {
            listing.soft_delete(actor, now)?;
            self.ctx.listing_repo().update(&listing).await?;
            info!(listing_id = %listing_id, "Listing taken down");
        }

        let update = ReportUpdate {
            status: ReportStatus::Reviewed,
            admin_note: request.admin_note,
            action_taken: Some(LISTING_REMOVED_ACTION.to_string()),
            updated_by: actor.id,
            updated_at: now,
        };
        let reports_updated = self
            .ctx
            .report_repo()
            .update_active_for_listing(listing_id, &update)
            .await?;

        info!(listing_id = %listing_id, reports_updated, "Reports closed after take-down");
        Ok(TakeDownResponse {
            listing_id,
            reports_updated,
        })
    }

    /// Counts by status, the most common reasons, and a zero-filled
    /// per-day series for the last week
    #[instrument(skip(self), fields(admin_id = %actor.id))]
    pub async fn report_stats(&self, actor: &Actor) -> ServiceResult<ReportStatsResponse> {
        require_admin(actor)?;
        let repo = self.ctx.report_repo();

        let mut by_status: BTreeMap<&'static str, i64> =
            ReportStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        for (status, count) in repo.count_by_status().await? {
            by_status.insert(status.as_str(), count);
        }

        let top_reasons = repo
            .top_reasons(TOP_REASONS)
            .await?
            .into_iter()
            .map(|(reason, count)| ReasonCount { reason, count })
            .collect();

        let today = Utc::now().date_naive();
        let first_day = today - Duration::days(STATS_DAYS - 1);
        let since = first_day.and_hms_opt(0, 0, 0).map_or_else(Utc::now, |d| d.and_utc());
        let counts: HashMap<_, _> = repo.daily_counts(since).await?.into_iter().collect();
        let daily = first_day
            .iter_days()
            .take(STATS_DAYS as usize)
            .map(|date| DailyCount {
                date,
                count: counts.get(&date).copied().unwrap_or(0),
            })
            .collect();

        Ok(ReportStatsResponse {
            by_status,
            top_reasons,
            daily,
        })
    }

    async fn load(&self, report_id: Snowflake) -> ServiceResult<ListingReport> {
        self.ctx
            .report_repo()
            .find_by_id(report_id)
            .await?
            .ok_or_else(|| DomainError::ReportNotFound(report_id).into())
    }
}
