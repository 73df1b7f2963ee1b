//! Listing entity and its lifecycle state machine
//!
//! ```text
//!            approve (admin)            mark_sold (owner)
//!  pending ───────────────────► active ───────────────────► sold
//!     │  ▲                        │
//!     │  └── owner edit ──┐       └── sweep ──► expired
//!     ▼                   │
//!  rejected ──────────────┘
//!
//!  any status except deleted ── soft_delete ──► deleted
//! ```
//!
//! Every transition takes the acting [`Actor`] and the current time so the
//! rules stay pure and testable.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{Actor, Snowflake};

/// Days an approved listing stays live before the sweep expires it
pub const LISTING_LIFETIME_DAYS: i64 = 30;

/// Used when an admin rejects without giving a reason
pub const DEFAULT_REJECTION_REASON: &str =
    "Your listing does not meet our posting guidelines. Please review and edit it.";

const MAX_BOOST_DAYS: i64 = 30;
const MAX_IMAGES: usize = 10;

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Pending,
    Active,
    Rejected,
    Sold,
    Expired,
    Deleted,
}

impl ListingStatus {
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Active,
        Self::Rejected,
        Self::Sold,
        Self::Expired,
        Self::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
            Self::Sold => "sold",
            Self::Expired => "expired",
            Self::Deleted => "deleted",
        }
    }
}

impl FromStr for ListingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidStatus(s.to_string()))
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Attribute enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Azn,
    Usd,
    Eur,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Azn => "AZN",
            Self::Usd => "USD",
            Self::Eur => "EUR",
        }
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AZN" => Ok(Self::Azn),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            _ => Err(DomainError::validation(format!("Unsupported currency: {s}"))),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    #[default]
    Used,
    Refurbished,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Used => "used",
            Self::Refurbished => "refurbished",
        }
    }
}

impl FromStr for Condition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "used" => Ok(Self::Used),
            "refurbished" => Ok(Self::Refurbished),
            _ => Err(DomainError::validation(format!("Invalid condition: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
    #[default]
    Phone,
    Email,
    Both,
}

impl ContactMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Both => "both",
        }
    }
}

impl FromStr for ContactMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "phone" => Ok(Self::Phone),
            "email" => Ok(Self::Email),
            "both" => Ok(Self::Both),
            _ => Err(DomainError::validation(format!("Invalid contact method: {s}"))),
        }
    }
}

// ============================================================================
// Boost duration
// ============================================================================

/// How long a promotion or feature lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostDuration {
    Day,
    Week,
    Month,
    Days(i64),
}

impl BoostDuration {
    /// Explicit day count, 1 to 30
    pub fn custom(days: i64) -> Result<Self, DomainError> {
        if (1..=MAX_BOOST_DAYS).contains(&days) {
            Ok(Self::Days(days))
        } else {
            Err(DomainError::validation(format!(
                "Duration must be between 1 and {MAX_BOOST_DAYS} days"
            )))
        }
    }

    /// An explicit day count wins over a named duration.
    pub fn resolve(label: Option<&str>, days: Option<i64>) -> Result<Self, DomainError> {
        match (days, label) {
            (Some(days), _) => Self::custom(days),
            (None, Some(label)) => label.parse(),
            (None, None) => Err(DomainError::validation("A duration is required")),
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
            Self::Days(n) => *n,
        }
    }

    pub fn ends_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(self.days())
    }
}

impl FromStr for BoostDuration {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(DomainError::validation(format!(
                "Invalid duration '{other}', expected day, week or month"
            ))),
        }
    }
}

// ============================================================================
// Listing
// ============================================================================

/// A classified ad owned by exactly one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
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
    pub rejection_reason: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// New listing awaiting moderation
    pub fn new(
        id: Snowflake,
        user_id: Snowflake,
        title: String,
        slug: String,
        description: String,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            category_id: None,
            title,
            slug,
            description,
            price,
            currency: Currency::default(),
            condition: Condition::default(),
            location: None,
            images: Vec::new(),
            featured_image: None,
            status: ListingStatus::Pending,
            is_promoted: false,
            promotion_end_date: None,
            is_featured: false,
            featured_until: None,
            views: 0,
            contact_phone: None,
            contact_email: None,
            contact_method: ContactMethod::default(),
            rejection_reason: None,
            expiry_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn check_price(price: Decimal) -> Result<(), DomainError> {
        if price.is_sign_negative() {
            return Err(DomainError::validation("Price cannot be negative"));
        }
        Ok(())
    }

    /// Replace the image list. The featured image must be one of `images`
    /// and defaults to the first.
    pub fn set_images(
        &mut self,
        images: Vec<String>,
        featured: Option<String>,
    ) -> Result<(), DomainError> {
        let images: Vec<String> = images
            .into_iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();

        if images.len() > MAX_IMAGES {
            return Err(DomainError::validation(format!(
                "A listing can have at most {MAX_IMAGES} images"
            )));
        }

        let featured = match featured.filter(|f| !f.trim().is_empty()) {
            Some(f) if images.iter().any(|i| *i == f) => Some(f),
            Some(_) => {
                return Err(DomainError::validation(
                    "Featured image must be one of the listing images",
                ))
            }
            None => images.first().cloned(),
        };

        self.images = images;
        self.featured_image = featured;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Access rules
    // ------------------------------------------------------------------------

    #[inline]
    pub fn is_owned_by(&self, user_id: Snowflake) -> bool {
        self.user_id == user_id
    }

    /// Owner or admin
    pub fn can_modify(&self, actor: &Actor) -> bool {
        self.is_owned_by(actor.id) || actor.is_admin()
    }

    pub fn ensure_can_modify(&self, actor: &Actor) -> Result<(), DomainError> {
        if self.can_modify(actor) {
            Ok(())
        } else {
            Err(DomainError::NotListingOwner)
        }
    }

    /// Active listings are public. Deleted ones are only shown to admins,
    /// everything else to the owner and admins.
    pub fn is_visible_to(&self, viewer: Option<&Actor>) -> bool {
        match (self.status, viewer) {
            (ListingStatus::Active, _) => true,
            (ListingStatus::Deleted, Some(v)) => v.is_admin(),
            (_, Some(v)) => self.can_modify(v),
            (_, None) => false,
        }
    }

    /// The owner looking at their own ad does not count as a view.
    pub fn counts_view_from(&self, viewer: Option<&Actor>) -> bool {
        viewer.is_none_or(|v| !self.is_owned_by(v.id))
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// `pending → active`, admin only. Starts the 30 day lifetime.
    pub fn approve(&mut self, actor: &Actor, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !actor.is_admin() {
            return Err(DomainError::forbidden("Only admins can approve listings"));
        }
        self.require_status(ListingStatus::Pending, ListingStatus::Active)?;

        self.status = ListingStatus::Active;
        self.expiry_date = Some(now + Duration::days(LISTING_LIFETIME_DAYS));
        self.rejection_reason = None;
        self.updated_at = now;
        Ok(())
    }

    /// `pending → rejected`, admin only
    pub fn reject(
        &mut self,
        actor: &Actor,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !actor.is_admin() {
            return Err(DomainError::forbidden("Only admins can reject listings"));
        }
        self.require_status(ListingStatus::Pending, ListingStatus::Rejected)?;

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());

        self.status = ListingStatus::Rejected;
        self.rejection_reason = Some(reason);
        self.updated_at = now;
        Ok(())
    }

    /// Soft delete. The row is kept with status `deleted`.
    pub fn soft_delete(&mut self, actor: &Actor, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_can_modify(actor)?;
        if self.status == ListingStatus::Deleted {
            return Err(DomainError::ListingAlreadyDeleted);
        }
        self.status = ListingStatus::Deleted;
        self.updated_at = now;
        Ok(())
    }

    /// `active → sold`. Only the owner may do this, admins included in the refusal.
    pub fn mark_sold(&mut self, actor: &Actor, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.is_owned_by(actor.id) {
            return Err(DomainError::NotListingOwner);
        }
        self.require_status(ListingStatus::Active, ListingStatus::Sold)?;
        self.status = ListingStatus::Sold;
        self.updated_at = now;
        Ok(())
    }

    /// General status change used by the listing edit screens.
    ///
    /// `rejected` is only reachable through [`Listing::reject`]. Reaching
    /// `active` from `pending` or `rejected` needs an admin, and only admins
    /// may touch `sold` or `deleted` listings.
    pub fn change_status(
        &mut self,
        actor: &Actor,
        target: ListingStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_can_modify(actor)?;

        if target == ListingStatus::Rejected {
            return Err(DomainError::InvalidStatus(
                "rejected (use the moderation endpoint)".to_string(),
            ));
        }
        if target == self.status {
            return Ok(());
        }

        let admin = actor.is_admin();
        match self.status {
            ListingStatus::Deleted if !admin => {
                return Err(DomainError::validation("Deleted listings cannot be changed"));
            }
            ListingStatus::Sold if !admin && target != ListingStatus::Deleted => {
                return Err(DomainError::InvalidTransition {
                    from: self.status,
                    to: target,
                });
            }
            ListingStatus::Pending | ListingStatus::Rejected
                if target == ListingStatus::Active && !admin =>
            {
                return Err(DomainError::forbidden(
                    "Only admins can approve pending listings",
                ));
            }
            _ => {}
        }

        if target == ListingStatus::Active {
            self.expiry_date = Some(now + Duration::days(LISTING_LIFETIME_DAYS));
        }
        if self.status == ListingStatus::Rejected {
            self.rejection_reason = None;
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }

    /// Bookkeeping for a content edit. A non-admin editing a rejected listing
    /// sends it back to moderation.
    pub fn apply_edit(&mut self, actor: &Actor, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_can_modify(actor)?;
        if self.status == ListingStatus::Deleted {
            return Err(DomainError::validation("Deleted listings cannot be edited"));
        }
        if self.status == ListingStatus::Rejected && !actor.is_admin() {
            self.status = ListingStatus::Pending;
            self.rejection_reason = None;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn promote(
        &mut self,
        actor: &Actor,
        duration: BoostDuration,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_boostable(actor)?;
        self.is_promoted = true;
        self.promotion_end_date = Some(duration.ends_at(now));
        self.updated_at = now;
        Ok(())
    }

    pub fn feature(
        &mut self,
        actor: &Actor,
        duration: BoostDuration,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_boostable(actor)?;
        self.is_featured = true;
        self.featured_until = Some(duration.ends_at(now));
        self.updated_at = now;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Sweep
    // ------------------------------------------------------------------------

    /// Featured with time left on the clock, whether or not the sweep has run
    pub fn is_featured_at(&self, now: DateTime<Utc>) -> bool {
        self.is_featured && self.featured_until.is_some_and(|until| until >= now)
    }

    /// Clears `is_featured` once `featured_until` has passed. Returns whether
    /// anything changed.
    pub fn clear_elapsed_feature(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_featured && self.featured_until.is_none_or(|until| until < now) {
            self.is_featured = false;
            return true;
        }
        false
    }

    pub fn clear_elapsed_promotion(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_promoted && self.promotion_end_date.is_none_or(|until| until < now) {
            self.is_promoted = false;
            return true;
        }
        false
    }

    /// `active → expired` once `expiry_date` has passed
    pub fn expire_if_elapsed(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == ListingStatus::Active && self.expiry_date.is_some_and(|at| at < now) {
            self.status = ListingStatus::Expired;
            return true;
        }
        false
    }

    // ------------------------------------------------------------------------

    fn require_status(
        &self,
        expected: ListingStatus,
        target: ListingStatus,
    ) -> Result<(), DomainError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: self.status,
                to: target,
            })
        }
    }

    fn ensure_boostable(&self, actor: &Actor) -> Result<(), DomainError> {
        self.ensure_can_modify(actor)?;
        if self.status != ListingStatus::Active {
            return Err(DomainError::ListingNotActive);
        }
        Ok(())
    }
}
