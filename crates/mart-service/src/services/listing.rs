//! Listing service
//!
//! Creation, the moderation and owner transitions, boosts, search, and the
//! maintenance sweep. State rules live on [`Listing`]; this layer loads,
//! authorizes, persists and logs.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use mart_core::value_objects::{random_suffix, slugify, with_suffix};
use mart_core::{
    Actor, BoostDuration, Condition, Currency, DomainError, Listing, ListingFilter, ListingSort,
    ListingStatus, PageRequest, Snowflake, SweepCounts,
};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{
    BoostRequest, ChangeStatusRequest, CreateListingRequest, ListingQuery, ListingResponse,
    MyListingsQuery, PageResponse, RejectListingRequest, UpdateListingRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::require_admin;

const SLUG_ATTEMPTS: usize = 5;
const DEFAULT_FEATURED_LIMIT: i64 = 10;
const MAX_FEATURED_LIMIT: i64 = 50;

pub struct ListingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ListingService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // ------------------------------------------------------------------------
    // Create / read
    // ------------------------------------------------------------------------

    /// New listings wait for moderation. Admins may ask for another status.
    #[instrument(skip(self, request), fields(user_id = %actor.id))]
    pub async fn create_listing(
        &self,
        actor: &Actor,
        request: CreateListingRequest,
    ) -> ServiceResult<ListingResponse> {
        request.validate()?;
        let listing = self.build_listing(actor, request, Utc::now()).await?;
        self.ctx.listing_repo().create(&listing).await?;

        info!(listing_id = %listing.id, slug = %listing.slug, status = %listing.status, "Listing created");
        Ok(listing.into())
    }

    /// Validate a creation request and turn it into an unsaved listing.
    /// Shared with the importer.
    pub(crate) async fn build_listing(
        &self,
        actor: &Actor,
        request: CreateListingRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<Listing> {
        Listing::check_price(request.price)?;
        if let Some(category_id) = request.category_id {
            self.ensure_category(category_id).await?;
        }

        let title = request.title.trim().to_string();
        let slug = self.unique_slug(&title).await?;

        let mut listing = Listing::new(
            self.ctx.generate_id(),
            actor.id,
            title,
            slug,
            request.description.trim().to_string(),
            request.price,
            now,
        );
        listing.category_id = request.category_id;
        listing.currency = request.currency;
        listing.condition = request.condition;
        listing.location = non_blank(request.location);
        listing.contact_phone = non_blank(request.contact_phone);
        listing.contact_email = non_blank(request.contact_email);
        listing.contact_method = request.contact_method;
        listing.set_images(request.images, request.featured_image)?;

        if actor.is_admin() {
            if let Some(status) = request.status.as_deref() {
                let target = ListingStatus::from_str(status)?;
                listing.change_status(actor, target, now)?;
            }
        }
        Ok(listing)
    }

    /// Returns the listing if `viewer` may see it and counts the view
    #[instrument(skip(self, viewer))]
    pub async fn get_listing(
        &self,
        viewer: Option<&Actor>,
        listing_id: Snowflake,
    ) -> ServiceResult<ListingResponse> {
        let listing = self.ctx.listing_repo().find_by_id(listing_id).await?;
        self.present(viewer, listing, || DomainError::ListingNotFound(listing_id))
    }

    #[instrument(skip(self, viewer))]
    pub async fn get_listing_by_slug(
        &self,
        viewer: Option<&Actor>,
        slug: &str,
    ) -> ServiceResult<ListingResponse> {
        let listing = self.ctx.listing_repo().find_by_slug(slug).await?;
        self.present(viewer, listing, || DomainError::ListingSlugNotFound(slug.to_string()))
    }

    fn present(
        &self,
        viewer: Option<&Actor>,
        listing: Option<Listing>,
        not_found: impl FnOnce() -> DomainError,
    ) -> ServiceResult<ListingResponse> {
        let mut listing = match listing {
            Some(l) if l.is_visible_to(viewer) => l,
            _ => return Err(not_found().into()),
        };

        if listing.counts_view_from(viewer) {
            self.count_view(listing.id);
            listing.views += 1;
        }
        Ok(listing.into())
    }

    /// Fire-and-forget increment; failures are logged and never surface
    fn count_view(&self, listing_id: Snowflake) {
        let repo = self.ctx.listing_repo_handle();
        tokio::spawn(async move {
            if let Err(e) = repo.increment_views(listing_id).await {
                warn!(listing_id = %listing_id, error = %e, "Failed to count listing view");
            }
        });
    }

    // ------------------------------------------------------------------------
    // Edits and transitions
    // ------------------------------------------------------------------------

    /// Partial edit by the owner or an admin. A non-admin editing a rejected
    /// listing sends it back to `pending`.
    #[instrument(skip(self, request), fields(user_id = %actor.id))]
    pub async fn update_listing(
        &self,
        actor: &Actor,
        listing_id: Snowflake,
        request: UpdateListingRequest,
    ) -> ServiceResult<ListingResponse> {
        request.validate()?;
        let mut listing = self.load(listing_id).await?;
        listing.ensure_can_modify(actor)?;
        let now = Utc::now();

        if let Some(title) = request.title {
            listing.title = title.trim().to_string();
        }
        if let Some(description) = request.description {
            listing.description = description.trim().to_string();
        }
        if let Some(price) = request.price {
            Listing::check_price(price)?;
            listing.price = price;
        }
        if let Some(currency) = request.currency {
            listing.currency = currency;
        }
        if let Some(condition) = request.condition {
            listing.condition = condition;
        }
        if let Some(category_id) = request.category_id {
            if let Some(id) = category_id {
                self.ensure_category(id).await?;
            }
            listing.category_id = category_id;
        }
        if let Some(location) = request.location {
            listing.location = non_blank(Some(location));
        }
        if let Some(phone) = request.contact_phone {
            listing.contact_phone = non_blank(Some(phone));
        }
        if let Some(email) = request.contact_email {
            listing.contact_email = non_blank(Some(email));
        }
        if let Some(method) = request.contact_method {
            listing.contact_method = method;
        }
        match (request.images, request.featured_image) {
            (Some(images), featured) => listing.set_images(images, featured)?,
            (None, Some(featured)) => {
                let images = std::mem::take(&mut listing.images);
                listing.set_images(images, Some(featured))?;
            }
            (None, None) => {}
        }

        listing.apply_edit(actor, now)?;
        if let Some(status) = request.status.as_deref() {
            listing.change_status(actor, ListingStatus::from_str(status)?, now)?;
        }

        self.ctx.listing_repo().update(&listing).await?;
        info!(listing_id = %listing.id, status = %listing.status, "Listing updated");
        Ok(listing.into())
    }

    #[instrument(skip(self), fields(user_id = %actor.id))]
    pub async fn delete_listing(&self, actor: &Actor, listing_id: Snowflake) -> ServiceResult<()> {
        let mut listing = self.load(listing_id).await?;
        listing.soft_delete(actor, Utc::now())?;
        self.ctx.listing_repo().update(&listing).await?;
        info!(listing_id = %listing.id, "Listing deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(admin_id = %actor.id))]
    pub async fn approve_listing(
        &self,
        actor: &Actor,
        listing_id: Snowflake,
    ) -> ServiceResult<ListingResponse> {
        let mut listing = self.load(listing_id).await?;
        listing.approve(actor, Utc::now())?;
        self.ctx.listing_repo().update(&listing).await?;
        info!(listing_id = %listing.id, expiry_date = ?listing.expiry_date, "Listing approved");
        Ok(listing.into())
    }

    #[instrument(skip(self, request), fields(admin_id = %actor.id))]
    pub async fn reject_listing(
        &self,
        actor: &Actor,
        listing_id: Snowflake,
        request: RejectListingRequest,
    ) -> ServiceResult<ListingResponse> {
        request.validate()?;
        let mut listing = self.load(listing_id).await?;
        listing.reject(actor, request.reason, Utc::now())?;
        self.ctx.listing_repo().update(&listing).await?;
        info!(listing_id = %listing.id, "Listing rejected");
        Ok(listing.into())
    }

    #[instrument(skip(self), fields(user_id = %actor.id))]
    pub async fn mark_as_sold(
        &self,
        actor: &Actor,
        listing_id: Snowflake,
    ) -> ServiceResult<ListingResponse> {
        let mut listing = self.load(listing_id).await?;
        listing.mark_sold(actor, Utc::now())?;
        self.ctx.listing_repo().update(&listing).await?;
        info!(listing_id = %listing.id, "Listing marked as sold");
        Ok(listing.into())
    }

    #[instrument(skip(self, request), fields(user_id = %actor.id, target = %request.status))]
    pub async fn change_listing_status(
        &self,
        actor: &Actor,
        listing_id: Snowflake,
        request: ChangeStatusRequest,
    ) -> ServiceResult<ListingResponse> {
        let target = ListingStatus::from_str(&request.status)?;
        let mut listing = self.load(listing_id).await?;
        let from = listing.status;
        listing.change_status(actor, target, Utc::now())?;
        self.ctx.listing_repo().update(&listing).await?;
        info!(listing_id = %listing.id, %from, to = %listing.status, "Listing status changed");
        Ok(listing.into())
    }

    #[instrument(skip(self, request), fields(user_id = %actor.id))]
    pub async fn promote_listing(
        &self,
        actor: &Actor,
        listing_id: Snowflake,
        request: BoostRequest,
    ) -> ServiceResult<ListingResponse> {
        let duration = BoostDuration::resolve(request.duration.as_deref(), request.days)?;
        let mut listing = self.load(listing_id).await?;
        listing.promote(actor, duration, Utc::now())?;
        self.ctx.listing_repo().update(&listing).await?;
        info!(listing_id = %listing.id, until = ?listing.promotion_end_date, "Listing promoted");
        Ok(listing.into())
    }

    #[instrument(skip(self, request), fields(user_id = %actor.id))]
    pub async fn feature_listing(
        &self,
        actor: &Actor,
        listing_id: Snowflake,
        request: BoostRequest,
    ) -> ServiceResult<ListingResponse> {
        let duration = BoostDuration::resolve(request.duration.as_deref(), request.days)?;
        let mut listing = self.load(listing_id).await?;
        listing.feature(actor, duration, Utc::now())?;
        self.ctx.listing_repo().update(&listing).await?;
        info!(listing_id = %listing.id, until = ?listing.featured_until, "Listing featured");
        Ok(listing.into())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Catalogue search. Status filters other than `active` need an admin.
    #[instrument(skip(self, viewer, query))]
    pub async fn search_listings(
        &self,
        viewer: Option<&Actor>,
        query: ListingQuery,
        page: PageRequest,
    ) -> ServiceResult<PageResponse<ListingResponse>> {
        let status = query.status.as_deref().map(ListingStatus::from_str).transpose()?;
        let is_admin = viewer.is_some_and(Actor::is_admin);
        if status.is_some_and(|s| s != ListingStatus::Active) && !is_admin {
            return Err(ServiceError::permission_denied(
                "Only admins can search listings by status",
            ));
        }

        let sort = parse_sort(query.sort.as_deref())?;
        let mut filter = build_filter(query)?;
        filter.statuses = vec![status.unwrap_or(ListingStatus::Active)];

        let listings = self.ctx.listing_repo().search(&filter, sort, page).await?;
        Ok(PageResponse::from_page(listings, ListingResponse::from))
    }

    /// The caller's own listings, any status but `deleted`
    #[instrument(skip(self, query), fields(user_id = %actor.id))]
    pub async fn my_listings(
        &self,
        actor: &Actor,
        query: MyListingsQuery,
        page: PageRequest,
    ) -> ServiceResult<PageResponse<ListingResponse>> {
        let statuses = match query.status.as_deref() {
            Some(s) => {
                let status = ListingStatus::from_str(s)?;
                if status == ListingStatus::Deleted {
                    return Err(DomainError::InvalidStatus(s.to_string()).into());
                }
                vec![status]
            }
            None => Vec::new(),
        };
        let filter = ListingFilter {
            user_id: Some(actor.id),
            statuses,
            ..ListingFilter::default()
        };

        let listings = self
            .ctx
            .listing_repo()
            .search(&filter, ListingSort::Newest, page)
            .await?;
        Ok(PageResponse::from_page(listings, ListingResponse::from))
    }

    #[instrument(skip(self))]
    pub async fn featured_listings(&self, limit: Option<i64>) -> ServiceResult<Vec<ListingResponse>> {
        let limit = limit
            .unwrap_or(DEFAULT_FEATURED_LIMIT)
            .clamp(1, MAX_FEATURED_LIMIT);
        let listings = self.ctx.listing_repo().featured(Utc::now(), limit).await?;
        Ok(listings.into_iter().map(ListingResponse::from).collect())
    }

    /// Moderation queue and catalogue for admins. Without a status filter
    /// every non-deleted listing is returned.
    #[instrument(skip(self, query), fields(admin_id = %actor.id))]
    pub async fn admin_listings(
        &self,
        actor: &Actor,
        query: ListingQuery,
        page: PageRequest,
    ) -> ServiceResult<PageResponse<ListingResponse>> {
        require_admin(actor)?;
        let status = query.status.as_deref().map(ListingStatus::from_str).transpose()?;
        let sort = parse_sort(query.sort.as_deref())?;
        let mut filter = build_filter(query)?;
        filter.statuses = status.into_iter().collect();

        let listings = self.ctx.listing_repo().search(&filter, sort, page).await?;
        Ok(PageResponse::from_page(listings, ListingResponse::from))
    }

    // ------------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------------

    /// Clear elapsed boosts and expire listings past their lifetime.
    /// The three statements are independent; a failure stops the sweep.
    #[instrument(skip(self))]
    pub async fn run_maintenance(&self, now: DateTime<Utc>) -> ServiceResult<SweepCounts> {
        let repo = self.ctx.listing_repo();
        let counts = SweepCounts {
            featured_cleared: repo.clear_expired_featured(now).await?,
            promotions_cleared: repo.clear_expired_promotions(now).await?,
            listings_expired: repo.expire_elapsed(now).await?,
        };
        info!(
            featured_cleared = counts.featured_cleared,
            promotions_cleared = counts.promotions_cleared,
            listings_expired = counts.listings_expired,
            "Maintenance sweep finished"
        );
        Ok(counts)
    }

    /// Admin-triggered sweep
    #[instrument(skip(self), fields(admin_id = %actor.id))]
    pub async fn sweep(&self, actor: &Actor) -> ServiceResult<SweepCounts> {
        require_admin(actor)?;
        self.run_maintenance(Utc::now()).await
    }

    // ------------------------------------------------------------------------

    async fn load(&self, listing_id: Snowflake) -> ServiceResult<Listing> {
        self.ctx
            .listing_repo()
            .find_by_id(listing_id)
            .await?
            .ok_or_else(|| DomainError::ListingNotFound(listing_id).into())
    }

    async fn ensure_category(&self, category_id: Snowflake) -> ServiceResult<()> {
        match self.ctx.category_repo().find_by_id(category_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::CategoryNotFound(category_id).into()),
        }
    }

    async fn unique_slug(&self, title: &str) -> ServiceResult<String> {
        let base = slugify(title);
        let mut candidate = base.clone();
        for _ in 0..SLUG_ATTEMPTS {
            if !self.ctx.listing_repo().slug_exists(&candidate).await? {
                return Ok(candidate);
            }
            candidate = with_suffix(&base, &random_suffix());
        }
        Err(ServiceError::conflict(format!(
            "Could not find a free slug for '{base}'"
        )))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_sort(sort: Option<&str>) -> ServiceResult<ListingSort> {
    Ok(sort.map(ListingSort::from_str).transpose()?.unwrap_or_default())
}

/// Everything but status, which the callers decide
fn build_filter(query: ListingQuery) -> ServiceResult<ListingFilter> {
    if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
        if min > max {
            return Err(ServiceError::validation(
                "min_price cannot be greater than max_price",
            ));
        }
    }
    Ok(ListingFilter {
        query: non_blank(query.q),
        category_id: query.category_id,
        user_id: query.user_id,
        min_price: query.min_price,
        max_price: query.max_price,
        currency: query.currency.as_deref().map(Currency::from_str).transpose()?,
        condition: query.condition.as_deref().map(Condition::from_str).transpose()?,
        location: non_blank(query.location),
        statuses: Vec::new(),
        is_featured: query.is_featured,
        is_promoted: query.is_promoted,
    })
}
