//! Listing reports raised by users and reviewed by admins

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Canned reasons offered to reporters. The stored reason is free text.
pub const REPORT_REASONS: [&str; 8] = [
    "Fake or fraudulent listing",
    "Prohibited item",
    "Wrong category",
    "Duplicate listing",
    "Offensive content",
    "Misleading information",
    "Item already sold",
    "Other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Reviewed,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub const ALL: [Self; 4] = [Self::Pending, Self::Reviewed, Self::Resolved, Self::Dismissed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Resolved => "resolved",
            Self::Dismissed => "dismissed",
        }
    }

    /// Pending and reviewed reports block a duplicate from the same reporter.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Reviewed)
    }
}

impl FromStr for ReportStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidStatus(s.to_string()))
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingReport {
    pub id: Snowflake,
    pub listing_id: Snowflake,
    pub reporter_id: Snowflake,
    pub reason: String,
    pub additional_info: Option<String>,
    pub status: ReportStatus,
    pub admin_note: Option<String>,
    pub last_updated_by: Option<Snowflake>,
    pub status_updated_at: Option<DateTime<Utc>>,
    pub action_taken: Option<String>,
    pub notification_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingReport {
    pub fn new(
        id: Snowflake,
        listing_id: Snowflake,
        reporter_id: Snowflake,
        reason: String,
        additional_info: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(DomainError::validation("A report reason is required"));
        }
        Ok(Self {
            id,
            listing_id,
            reporter_id,
            reason,
            additional_info: additional_info
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            status: ReportStatus::Pending,
            admin_note: None,
            last_updated_by: None,
            status_updated_at: None,
            action_taken: None,
            notification_sent: false,
            created_at: now,
            updated_at: now,
        })
    }
}

/// An admin decision applied to one or many reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportUpdate {
    pub status: ReportStatus,
    pub admin_note: Option<String>,
    pub action_taken: Option<String>,
    pub updated_by: Snowflake,
    pub updated_at: DateTime<Utc>,
}

impl ReportUpdate {
    /// Notes and actions left out keep their previous value.
    pub fn apply(&self, report: &mut ListingReport) {
        report.status = self.status;
        if let Some(note) = &self.admin_note {
            report.admin_note = Some(note.clone());
        }
        if let Some(action) = &self.action_taken {
            report.action_taken = Some(action.clone());
        }
        report.last_updated_by = Some(self.updated_by);
        report.status_updated_at = Some(self.updated_at);
        report.updated_at = self.updated_at;
    }
}
