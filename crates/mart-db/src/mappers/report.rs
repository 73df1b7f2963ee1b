//! Report rows -> entities

use std::str::FromStr;

use mart_core::entities::ListingReport;
use mart_core::error::DomainError;
use mart_core::value_objects::Snowflake;

use super::parse_column;
use crate::models::{ReportModel, StatusCountModel};

impl TryFrom<ReportModel> for ListingReport {
    type Error = DomainError;

    fn try_from(model: ReportModel) -> Result<Self, Self::Error> {
        Ok(ListingReport {
            id: Snowflake::new(model.id),
            listing_id: Snowflake::new(model.listing_id),
            reporter_id: Snowflake::new(model.reporter_id),
            reason: model.reason,
            additional_info: model.additional_info,
            status: parse_column("status", &model.status)?,
            admin_note: model.admin_note,
            last_updated_by: model.last_updated_by.map(Snowflake::new),
            status_updated_at: model.status_updated_at,
            action_taken: model.action_taken,
            notification_sent: model.notification_sent,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Parse `GROUP BY status` rows into typed pairs
pub fn status_counts<S>(rows: Vec<StatusCountModel>) -> Result<Vec<(S, i64)>, DomainError>
where
    S: FromStr,
{
    rows.into_iter()
        .map(|row| -> Result<(S, i64), DomainError> {
            Ok((parse_column("status", &row.status)?, row.count))
        })
        .collect()
}
