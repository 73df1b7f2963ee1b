//! Admin dashboard

use std::collections::BTreeMap;

use mart_core::{Actor, ListingStatus, ReportStatus};
use tracing::instrument;

use crate::dto::DashboardStatsResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::require_admin;

pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Headline counts. Every listing status is present, zero when unused.
    #[instrument(skip(self), fields(admin_id = %actor.id))]
    pub async fn dashboard_stats(&self, actor: &Actor) -> ServiceResult<DashboardStatsResponse> {
        require_admin(actor)?;

        let mut listings_by_status: BTreeMap<&'static str, i64> =
            ListingStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        for (status, count) in self.ctx.listing_repo().count_by_status().await? {
            listings_by_status.insert(status.as_str(), count);
        }

        let pending_reports = self
            .ctx
            .report_repo()
            .count_by_status()
            .await?
            .into_iter()
            .find(|(status, _)| *status == ReportStatus::Pending)
            .map_or(0, |(_, count)| count);

        Ok(DashboardStatsResponse {
            total_users: self.ctx.user_repo().count().await?,
            listings_by_status,
            pending_reports,
            total_categories: self.ctx.category_repo().count().await?,
        })
    }
}
