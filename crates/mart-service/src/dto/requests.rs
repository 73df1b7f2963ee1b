//! Request DTOs for API endpoints
//!
//! Bodies implement `Deserialize` and `Validate`. Query structs only
//! deserialize; their values are parsed into domain types by the services so
//! that bad values surface as 400s with a domain error code.

use std::collections::BTreeMap;

use mart_core::{
    Condition, ContactMethod, Currency, FavoriteItemType, ReportStatus, Snowflake, UserRole,
    UserStatus,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::Validate;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Auth Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: String,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

// ============================================================================
// User Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: Option<String>,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub profile_image: Option<String>,
}

/// Admin user listing filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: UserStatus,
}

// ============================================================================
// Listing Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: String,

    #[validate(length(min = 10, max = 5000, message = "Description must be 10-5000 characters"))]
    pub description: String,

    pub price: Decimal,

    #[serde(default)]
    pub currency: Currency,

    #[serde(default)]
    pub condition: Condition,

    pub category_id: Option<Snowflake>,

    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub location: Option<String>,

    #[serde(default)]
    #[validate(length(max = 10, message = "A listing can have at most 10 images"))]
    pub images: Vec<String>,

    pub featured_image: Option<String>,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub contact_phone: Option<String>,

    #[validate(email(message = "Invalid contact email"))]
    pub contact_email: Option<String>,

    #[serde(default)]
    pub contact_method: ContactMethod,

    /// Honoured only for admins
    pub status: Option<String>,
}

/// Partial listing edit. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateListingRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 10, max = 5000, message = "Description must be 10-5000 characters"))]
    pub description: Option<String>,

    pub price: Option<Decimal>,

    pub currency: Option<Currency>,

    pub condition: Option<Condition>,

    /// `null` removes the category
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<Snowflake>>,

    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 10, message = "A listing can have at most 10 images"))]
    pub images: Option<Vec<String>>,

    pub featured_image: Option<String>,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub contact_phone: Option<String>,

    #[validate(email(message = "Invalid contact email"))]
    pub contact_email: Option<String>,

    pub contact_method: Option<ContactMethod>,

    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RejectListingRequest {
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

/// `duration` is `day`, `week` or `month`; `days` wins when both are given
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BoostRequest {
    pub duration: Option<String>,
    pub days: Option<i64>,
}

/// Listing search parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub category_id: Option<Snowflake>,
    pub user_id: Option<Snowflake>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub currency: Option<String>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub is_featured: Option<bool>,
    pub is_promoted: Option<bool>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MyListingsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeaturedQuery {
    pub limit: Option<i64>,
}

// ============================================================================
// Category Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    /// Derived from the name when omitted
    #[validate(length(min = 2, max = 100, message = "Slug must be 2-100 characters"))]
    pub slug: Option<String>,

    pub parent_id: Option<Snowflake>,

    pub is_active: Option<bool>,

    pub display_order: Option<i32>,

    #[serde(default)]
    pub translations: BTreeMap<String, String>,

    pub attributes: Option<serde_json::Value>,

    pub image: Option<String>,

    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 2, max = 100, message = "Slug must be 2-100 characters"))]
    pub slug: Option<String>,

    /// `null` makes the category a root
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Snowflake>>,

    pub is_active: Option<bool>,

    pub display_order: Option<i32>,

    pub translations: Option<BTreeMap<String, String>>,

    pub attributes: Option<serde_json::Value>,

    pub image: Option<String>,

    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub include_inactive: bool,
    /// Locale used for the display name
    pub lang: Option<String>,
}

// ============================================================================
// Conversation Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateConversationRequest {
    pub recipient_id: Snowflake,

    pub listing_id: Option<Snowflake>,

    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationQuery {
    #[serde(default)]
    pub archived: bool,
}

// ============================================================================
// Report Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReportRequest {
    #[validate(length(min = 1, max = 200, message = "Reason must be 1-200 characters"))]
    pub reason: String,

    #[validate(length(max = 1000, message = "Additional info must be at most 1000 characters"))]
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateReportRequest {
    pub status: ReportStatus,

    #[validate(length(max = 1000, message = "Admin note must be at most 1000 characters"))]
    pub admin_note: Option<String>,

    #[validate(length(max = 100, message = "Action must be at most 100 characters"))]
    pub action_taken: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkUpdateReportsRequest {
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 report ids are required"))]
    pub ids: Vec<Snowflake>,

    pub status: ReportStatus,

    #[validate(length(max = 1000, message = "Admin note must be at most 1000 characters"))]
    pub admin_note: Option<String>,

    #[validate(length(max = 100, message = "Action must be at most 100 characters"))]
    pub action_taken: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TakeDownRequest {
    #[validate(length(max = 1000, message = "Admin note must be at most 1000 characters"))]
    pub admin_note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub status: Option<ReportStatus>,
    pub listing_id: Option<Snowflake>,
    pub reporter_id: Option<Snowflake>,
}

// ============================================================================
// Favorite Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddFavoriteRequest {
    pub item_type: FavoriteItemType,
    pub item_id: Snowflake,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoriteQuery {
    pub item_type: Option<FavoriteItemType>,
}

// ============================================================================
// Import Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImportRequest {
    #[validate(url(message = "A valid URL is required"))]
    pub url: String,

    /// Applied to every imported listing
    pub category_id: Option<Snowflake>,

    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub location: Option<String>,
}
