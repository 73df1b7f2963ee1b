//! Category endpoints

use axum::extract::{Path, State};
use mart_service::dto::{
    CategoryDeletion, CategoryQuery, CategoryResponse, CategoryTreeResponse,
    CreateCategoryRequest, UpdateCategoryRequest,
};
use mart_service::CategoryService;

use crate::extractors::{AuthUser, IdPath, OptionalAuthUser, QueryParams, ValidatedJson};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::state::AppState;

/// GET /categories
pub async fn list_categories(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    QueryParams(query): QueryParams<CategoryQuery>,
) -> ApiResult<ApiResponse<Vec<CategoryResponse>>> {
    let service = CategoryService::new(state.service_context());
    let response = service.list_categories(viewer.actor(), query).await?;
    Ok(ApiResponse::ok(response))
}

/// GET /categories/tree
pub async fn category_tree(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    QueryParams(query): QueryParams<CategoryQuery>,
) -> ApiResult<ApiResponse<Vec<CategoryTreeResponse>>> {
    let service = CategoryService::new(state.service_context());
    let response = service.category_tree(viewer.actor(), query).await?;
    Ok(ApiResponse::ok(response))
}

/// GET /categories/slug/{slug}
pub async fn get_category_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    QueryParams(query): QueryParams<CategoryQuery>,
) -> ApiResult<ApiResponse<CategoryResponse>> {
    let service = CategoryService::new(state.service_context());
    let response = service
        .get_category_by_slug(&slug, query.lang.as_deref())
        .await?;
    Ok(ApiResponse::ok(response))
}

/// GET /categories/{category_id}
pub async fn get_category(
    State(state): State<AppState>,
    IdPath(category_id): IdPath,
    QueryParams(query): QueryParams<CategoryQuery>,
) -> ApiResult<ApiResponse<CategoryResponse>> {
    let service = CategoryService::new(state.service_context());
    let response = service
        .get_category(category_id, query.lang.as_deref())
        .await?;
    Ok(ApiResponse::ok(response))
}

/// GET /categories/{category_id}/children
pub async fn get_children(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    IdPath(category_id): IdPath,
    QueryParams(query): QueryParams<CategoryQuery>,
) -> ApiResult<ApiResponse<Vec<CategoryResponse>>> {
    let service = CategoryService::new(state.service_context());
    let response = service
        .get_children(viewer.actor(), category_id, query)
        .await?;
    Ok(ApiResponse::ok(response))
}

/// POST /categories
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateCategoryRequest>,
) -> ApiResult<Created<ApiResponse<CategoryResponse>>> {
    let service = CategoryService::new(state.service_context());
    let response = service.create_category(&auth.actor, request).await?;
    Ok(Created(ApiResponse::ok(response)))
}

/// PATCH /categories/{category_id}
pub async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(category_id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateCategoryRequest>,
) -> ApiResult<ApiResponse<CategoryResponse>> {
    let service = CategoryService::new(state.service_context());
    let response = service
        .update_category(&auth.actor, category_id, request)
        .await?;
    Ok(ApiResponse::ok(response))
}

/// DELETE /categories/{category_id}
///
/// `data` says whether the row was removed or only deactivated.
pub async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(category_id): IdPath,
) -> ApiResult<ApiResponse<CategoryDeletion>> {
    let service = CategoryService::new(state.service_context());
    let outcome = service.delete_category(&auth.actor, category_id).await?;
    let message = match outcome {
        CategoryDeletion::Removed => "Category deleted",
        CategoryDeletion::Deactivated => "Category has listings and was deactivated",
    };
    Ok(ApiResponse::with_message(outcome, message))
}
