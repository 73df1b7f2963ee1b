//! Listing database model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ListingModel {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub currency: String,
    pub condition: String,
    pub location: Option<String>,
    pub images: Vec<String>,
    pub featured_image: Option<String>,
    pub status: String,
    pub is_promoted: bool,
    pub promotion_end_date: Option<DateTime<Utc>>,
    pub is_featured: bool,
    pub featured_until: Option<DateTime<Utc>>,
    pub views: i64,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub contact_method: String,
    pub rejection_reason: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingModel {
    /// Column list shared by every listing query
    pub const COLUMNS: &'static str = "id, user_id, category_id, title, slug, description, price, \
        currency, condition, location, images, featured_image, status, is_promoted, \
        promotion_end_date, is_featured, featured_until, views, contact_phone, contact_email, \
        contact_method, rejection_reason, expiry_date, created_at, updated_at";
}
