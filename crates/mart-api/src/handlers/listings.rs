//! Listing endpoints
//!
//! Reads are public; an optional bearer token widens what the caller may see
//! (owners see their own pending listings, admins see everything).

use axum::extract::{Path, State};
use mart_service::dto::{
    BoostRequest, ChangeStatusRequest, CreateListingRequest, FeaturedQuery, ListingQuery,
    ListingResponse, PageResponse, UpdateListingRequest,
};
use mart_service::ListingService;

use crate::extractors::{
    AuthUser, IdPath, OptionalAuthUser, Pagination, QueryParams, ValidatedJson,
};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::state::AppState;

/// GET /listings
pub async fn search_listings(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    QueryParams(query): QueryParams<ListingQuery>,
    Pagination(page): Pagination,
) -> ApiResult<ApiResponse<PageResponse<ListingResponse>>> {
    let service = ListingService::new(state.service_context());
    let response = service.search_listings(viewer.actor(), query, page).await?;
    Ok(ApiResponse::ok(response))
}

/// POST /listings
pub async fn create_listing(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateListingRequest>,
) -> ApiResult<Created<ApiResponse<ListingResponse>>> {
    let service = ListingService::new(state.service_context());
    let response = service.create_listing(&auth.actor, request).await?;
    Ok(Created(ApiResponse::with_message(
        response,
        "Listing submitted for review",
    )))
}

/// GET /listings/featured
pub async fn featured_listings(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<FeaturedQuery>,
) -> ApiResult<ApiResponse<Vec<ListingResponse>>> {
    let service = ListingService::new(state.service_context());
    let response = service.featured_listings(query.limit).await?;
    Ok(ApiResponse::ok(response))
}

/// GET /listings/slug/{slug}
pub async fn get_listing_by_slug(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(slug): Path<String>,
) -> ApiResult<ApiResponse<ListingResponse>> {
    let service = ListingService::new(state.service_context());
    let response = service.get_listing_by_slug(viewer.actor(), &slug).await?;
    Ok(ApiResponse::ok(response))
}

/// GET /listings/{listing_id}
pub async fn get_listing(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    IdPath(listing_id): IdPath,
) -> ApiResult<ApiResponse<ListingResponse>> {
    let service = ListingService::new(state.service_context());
    let response = service.get_listing(viewer.actor(), listing_id).await?;
    Ok(ApiResponse::ok(response))
}

/// PATCH /listings/{listing_id}
pub async fn update_listing(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(listing_id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateListingRequest>,
) -> ApiResult<ApiResponse<ListingResponse>> {
    let service = ListingService::new(state.service_context());
    let response = service.update_listing(&auth.actor, listing_id, request).await?;
    Ok(ApiResponse::with_message(response, "Listing updated"))
}

/// DELETE /listings/{listing_id}
pub async fn delete_listing(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(listing_id): IdPath,
) -> ApiResult<ApiResponse<()>> {
    let service = ListingService::new(state.service_context());
    service.delete_listing(&auth.actor, listing_id).await?;
    Ok(ApiResponse::message("Listing deleted"))
}

/// PATCH /listings/{listing_id}/status
pub async fn change_status(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(listing_id): IdPath,
    ValidatedJson(request): ValidatedJson<ChangeStatusRequest>,
) -> ApiResult<ApiResponse<ListingResponse>> {
    let service = ListingService::new(state.service_context());
    let response = service
        .change_listing_status(&auth.actor, listing_id, request)
        .await?;
    Ok(ApiResponse::ok(response))
}

/// POST /listings/{listing_id}/sold
pub async fn mark_sold(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(listing_id): IdPath,
) -> ApiResult<ApiResponse<ListingResponse>> {
    let service = ListingService::new(state.service_context());
    let response = service.mark_as_sold(&auth.actor, listing_id).await?;
    Ok(ApiResponse::with_message(response, "Listing marked as sold"))
}

/// POST /listings/{listing_id}/promote
pub async fn promote_listing(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(listing_id): IdPath,
    ValidatedJson(request): ValidatedJson<BoostRequest>,
) -> ApiResult<ApiResponse<ListingResponse>> {
    let service = ListingService::new(state.service_context());
    let response = service.promote_listing(&auth.actor, listing_id, request).await?;
    Ok(ApiResponse::ok(response))
}

/// POST /listings/{listing_id}/feature
pub async fn feature_listing(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(listing_id): IdPath,
    ValidatedJson(request): ValidatedJson<BoostRequest>,
) -> ApiResult<ApiResponse<ListingResponse>> {
    let service = ListingService::new(state.service_context());
    let response = service.feature_listing(&auth.actor, listing_id, request).await?;
    Ok(ApiResponse::ok(response))
}
