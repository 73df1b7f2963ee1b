//! Listing report database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ReportModel {
    pub id: i64,
    pub listing_id: i64,
    pub reporter_id: i64,
    pub reason: String,
    pub additional_info: Option<String>,
    pub status: String,
    pub admin_note: Option<String>,
    pub last_updated_by: Option<i64>,
    pub status_updated_at: Option<DateTime<Utc>>,
    pub action_taken: Option<String>,
    pub notification_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `GROUP BY status` row, shared by listing and report statistics
#[derive(Debug, Clone, FromRow)]
pub struct StatusCountModel {
    pub status: String,
    pub count: i64,
}
