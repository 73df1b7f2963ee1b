//! Pagination, filters and sort orders shared by the repositories

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::entities::{
    Condition, Currency, Listing, ListingReport, ListingStatus, ReportStatus, User, UserRole,
    UserStatus,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

// ============================================================================
// Pagination
// ============================================================================

/// 1-based page request, clamped to sane bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total match count
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }

    /// Cut a page out of an already filtered, ordered list
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit as usize)
            .collect();
        Self::new(items, total, request)
    }

    pub fn total_pages(&self) -> i64 {
        if self.limit == 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        (self.total + limit - 1) / limit
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

// ============================================================================
// Listings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingSort {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    MostViewed,
}

impl ListingSort {
    /// Ordering used for result sets. Newest puts listings featured at `now` first.
    pub fn compare(&self, a: &Listing, b: &Listing, now: DateTime<Utc>) -> Ordering {
        let by_id = || b.id.cmp(&a.id);
        match self {
            Self::Newest => b
                .is_featured_at(now)
                .cmp(&a.is_featured_at(now))
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(by_id),
            Self::Oldest => a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)),
            Self::PriceAsc => a.price.cmp(&b.price).then_with(by_id),
            Self::PriceDesc => b.price.cmp(&a.price).then_with(by_id),
            Self::MostViewed => b.views.cmp(&a.views).then_with(by_id),
        }
    }
}

impl FromStr for ListingSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "most_viewed" => Ok(Self::MostViewed),
            other => Err(DomainError::validation(format!("Invalid sort: {other}"))),
        }
    }
}

/// Listing search criteria. An empty `statuses` means every status except `deleted`.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub query: Option<String>,
    pub category_id: Option<Snowflake>,
    pub user_id: Option<Snowflake>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub currency: Option<Currency>,
    pub condition: Option<Condition>,
    pub location: Option<String>,
    pub statuses: Vec<ListingStatus>,
    pub is_featured: Option<bool>,
    pub is_promoted: Option<bool>,
}

impl ListingFilter {
    /// Public catalogue: active listings only
    pub fn public() -> Self {
        Self {
            statuses: vec![ListingStatus::Active],
            ..Self::default()
        }
    }

    pub fn allows_status(&self, status: ListingStatus) -> bool {
        if self.statuses.is_empty() {
            status != ListingStatus::Deleted
        } else {
            self.statuses.contains(&status)
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        fn contains_ci(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }

        self.allows_status(listing.status)
            && self.query.as_deref().is_none_or(|q| {
                contains_ci(&listing.title, q) || contains_ci(&listing.description, q)
            })
            && self.category_id.is_none_or(|c| listing.category_id == Some(c))
            && self.user_id.is_none_or(|u| listing.user_id == u)
            && self.min_price.is_none_or(|p| listing.price >= p)
            && self.max_price.is_none_or(|p| listing.price <= p)
            && self.currency.is_none_or(|c| listing.currency == c)
            && self.condition.is_none_or(|c| listing.condition == c)
            && self.location.as_deref().is_none_or(|loc| {
                listing
                    .location
                    .as_deref()
                    .is_some_and(|l| contains_ci(l, loc))
            })
            && self.is_featured.is_none_or(|f| listing.is_featured == f)
            && self.is_promoted.is_none_or(|p| listing.is_promoted == p)
    }
}

/// Rows touched by one maintenance sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepCounts {
    pub featured_cleared: u64,
    pub promotions_cleared: u64,
    pub listings_expired: u64,
}

// ============================================================================
// Reports and users
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub listing_id: Option<Snowflake>,
    pub reporter_id: Option<Snowflake>,
}

impl ReportFilter {
    pub fn matches(&self, report: &ListingReport) -> bool {
        self.status.is_none_or(|s| report.status == s)
            && self.listing_id.is_none_or(|l| report.listing_id == l)
            && self.reporter_id.is_none_or(|r| report.reporter_id == r)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    /// Matches email, first or last name
    pub search: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.role.is_none_or(|r| user.role == r)
            && self.status.is_none_or(|s| user.status == s)
            && self.search.as_deref().is_none_or(|q| {
                let q = q.to_lowercase();
                [&user.email, &user.first_name, &user.last_name]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&q))
            })
    }
}
