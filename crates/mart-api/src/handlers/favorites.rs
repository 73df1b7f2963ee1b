//! Favorites endpoints

use axum::extract::{Path, State};
use mart_service::dto::{
    AddFavoriteRequest, FavoriteQuery, FavoriteResponse, FavoriteStatusResponse, PageResponse,
};
use mart_service::FavoriteService;

use crate::extractors::{AuthUser, FavoritePath, Pagination, QueryParams, ValidatedJson};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::state::AppState;

/// GET /favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<FavoriteQuery>,
    Pagination(page): Pagination,
) -> ApiResult<ApiResponse<PageResponse<FavoriteResponse>>> {
    let service = FavoriteService::new(state.service_context());
    let response = service.list_favorites(&auth.actor, query, page).await?;
    Ok(ApiResponse::ok(response))
}

/// POST /favorites
pub async fn add_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<AddFavoriteRequest>,
) -> ApiResult<Created<ApiResponse<FavoriteResponse>>> {
    let service = FavoriteService::new(state.service_context());
    let response = service.add_favorite(&auth.actor, request).await?;
    Ok(Created(ApiResponse::with_message(response, "Added to favorites")))
}

/// GET /favorites/{item_type}/{item_id}
pub async fn is_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<FavoritePath>,
) -> ApiResult<ApiResponse<FavoriteStatusResponse>> {
    let service = FavoriteService::new(state.service_context());
    let response = service
        .is_favorite(&auth.actor, path.item_type()?, path.item_id()?)
        .await?;
    Ok(ApiResponse::ok(response))
}

/// DELETE /favorites/{item_type}/{item_id}
pub async fn remove_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<FavoritePath>,
) -> ApiResult<ApiResponse<()>> {
    let service = FavoriteService::new(state.service_context());
    service
        .remove_favorite(&auth.actor, path.item_type()?, path.item_id()?)
        .await?;
    Ok(ApiResponse::message("Removed from favorites"))
}
