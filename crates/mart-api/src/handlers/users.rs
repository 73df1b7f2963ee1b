//! Profile endpoints

use axum::extract::State;
use mart_service::dto::{
    ListingResponse, MyListingsQuery, PageResponse, PublicUserResponse, UpdateProfileRequest,
    UserResponse,
};
use mart_service::{ListingService, UserService};

use crate::extractors::{AuthUser, IdPath, Pagination, QueryParams, ValidatedJson};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /users/me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<UserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.get_current_user(auth.actor.id).await?;
    Ok(ApiResponse::ok(response))
}

/// PATCH /users/me
pub async fn update_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<ApiResponse<UserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.update_profile(auth.actor.id, request).await?;
    Ok(ApiResponse::with_message(response, "Profile updated"))
}

/// GET /users/me/listings
pub async fn my_listings(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<MyListingsQuery>,
    Pagination(page): Pagination,
) -> ApiResult<ApiResponse<PageResponse<ListingResponse>>> {
    let service = ListingService::new(state.service_context());
    let response = service.my_listings(&auth.actor, query, page).await?;
    Ok(ApiResponse::ok(response))
}

/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    IdPath(user_id): IdPath,
) -> ApiResult<ApiResponse<PublicUserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.get_public_profile(user_id).await?;
    Ok(ApiResponse::ok(response))
}
