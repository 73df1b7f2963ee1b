//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs serialize as strings for JavaScript compatibility.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use mart_core::{
    Condition, ContactMethod, Currency, FavoriteItemType, ListingStatus, Page, ReportStatus,
    Snowflake, UserRole, UserStatus,
};
use mart_import::{ImportCandidate, PageKind};
use rust_decimal::Decimal;
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// Offset pagination wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub current_page: u32,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    /// Convert a repository page, mapping each item
    pub fn from_page<U>(page: Page<U>, f: impl FnMut(U) -> T) -> Self {
        let total_pages = page.total_pages();
        let page = page.map(f);
        Self {
            items: page.items,
            total: page.total,
            current_page: page.page,
            total_pages,
        }
    }
}

// ============================================================================
// Auth / User Responses
// ============================================================================

/// The caller's own account
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Snowflake,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub profile_image: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// What other users may see
#[derive(Debug, Clone, Serialize)]
pub struct PublicUserResponse {
    pub id: Snowflake,
    pub first_name: String,
    pub last_name: String,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

// ============================================================================
// Listing Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ListingResponse {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub category_id: Option<Snowflake>,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub currency: Currency,
    pub condition: Condition,
    pub location: Option<String>,
    pub images: Vec<String>,
    pub featured_image: Option<String>,
    pub status: ListingStatus,
    pub is_promoted: bool,
    pub promotion_end_date: Option<DateTime<Utc>>,
    pub is_featured: bool,
    pub featured_until: Option<DateTime<Utc>>,
    pub views: i64,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub contact_method: ContactMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact listing card used inside favorites
#[derive(Debug, Clone, Serialize)]
pub struct ListingSummary {
    pub id: Snowflake,
    pub title: String,
    pub slug: String,
    pub price: Decimal,
    pub currency: Currency,
    pub featured_image: Option<String>,
    pub status: ListingStatus,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SweepResponse {
    pub featured_cleared: u64,
    pub promotions_cleared: u64,
    pub listings_expired: u64,
}

// ============================================================================
// Category Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: Snowflake,
    /// Localized when a locale was requested
    pub name: String,
    pub slug: String,
    pub parent_id: Option<Snowflake>,
    pub is_active: bool,
    pub display_order: i32,
    pub translations: BTreeMap<String, String>,
    pub attributes: serde_json::Value,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTreeResponse {
    #[serde(flatten)]
    pub category: CategoryResponse,
    pub children: Vec<CategoryTreeResponse>,
}

/// Outcome of a category delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryDeletion {
    /// No children or listings; the row is gone
    Removed,
    /// Listings still reference it, so it was hidden instead
    Deactivated,
}

// ============================================================================
// Conversation Responses
// ============================================================================

/// A conversation seen from one participant
#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub id: Snowflake,
    pub other_user_id: Snowflake,
    pub listing_id: Option<Snowflake>,
    pub unread_count: i32,
    pub is_archived: bool,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub receiver_id: Snowflake,
    pub content: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Returned when a conversation is opened or reused
#[derive(Debug, Clone, Serialize)]
pub struct ConversationStartedResponse {
    pub conversation: ConversationResponse,
    pub message: MessageResponse,
    pub reused: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MarkReadResponse {
    pub messages_read: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UnreadSummaryResponse {
    pub total_unread: i64,
    pub conversations_with_unread: i64,
}

// ============================================================================
// Report Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BulkUpdateResponse {
    pub updated: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TakeDownResponse {
    pub listing_id: Snowflake,
    pub reports_updated: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReasonCount {
    pub reason: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportStatsResponse {
    /// Every status is present, zero when unused
    pub by_status: BTreeMap<&'static str, i64>,
    pub top_reasons: Vec<ReasonCount>,
    /// Oldest day first
    pub daily: Vec<DailyCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportReasonsResponse {
    pub reasons: Vec<&'static str>,
}

// ============================================================================
// Favorite Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FavoriteResponse {
    pub id: Snowflake,
    pub item_type: FavoriteItemType,
    pub item_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<ListingSummary>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FavoriteStatusResponse {
    pub is_favorite: bool,
}

// ============================================================================
// Import Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ImportPreviewResponse {
    pub kind: PageKind,
    pub candidates: Vec<ImportCandidate>,
}

/// A candidate that could not become a listing
#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    pub index: usize,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportResultResponse {
    pub kind: PageKind,
    pub created: Vec<ListingResponse>,
    pub errors: Vec<ImportFailure>,
}

// ============================================================================
// Admin Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStatsResponse {
    pub total_users: i64,
    pub listings_by_status: BTreeMap<&'static str, i64>,
    pub pending_reports: i64,
    pub total_categories: i64,
}

// ============================================================================
// Health Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
