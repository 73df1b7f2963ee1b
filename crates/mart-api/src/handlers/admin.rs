//! Administration endpoints
//!
//! Every handler authenticates normally; the services enforce the admin
//! role, so a regular user gets a 403 from the same code path.

use axum::extract::State;
use mart_service::dto::{
    BulkUpdateReportsRequest, BulkUpdateResponse, DashboardStatsResponse, ImportPreviewResponse,
    ImportRequest, ImportResultResponse, ListingQuery, ListingResponse, PageResponse,
    RejectListingRequest, ReportQuery, ReportResponse, ReportStatsResponse, SweepResponse,
    TakeDownRequest, TakeDownResponse, UpdateReportRequest, UpdateRoleRequest,
    UpdateStatusRequest, UserQuery, UserResponse,
};
use mart_service::{
    AdminService, ImportService, ListingService, ReportService, UserService,
};

use crate::extractors::{
    AuthUser, IdPath, OptionalValidatedJson, Pagination, QueryParams, ValidatedJson,
};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::state::AppState;

/// GET /admin/stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<DashboardStatsResponse>> {
    let service = AdminService::new(state.service_context());
    let response = service.dashboard_stats(&auth.actor).await?;
    Ok(ApiResponse::ok(response))
}

// ============================================================================
// Listing moderation
// ============================================================================

/// GET /admin/listings
pub async fn list_listings(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ListingQuery>,
    Pagination(page): Pagination,
) -> ApiResult<ApiResponse<PageResponse<ListingResponse>>> {
    let service = ListingService::new(state.service_context());
    let response = service.admin_listings(&auth.actor, query, page).await?;
    Ok(ApiResponse::ok(response))
}

/// POST /admin/listings/{listing_id}/approve
pub async fn approve_listing(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(listing_id): IdPath,
) -> ApiResult<ApiResponse<ListingResponse>> {
    let service = ListingService::new(state.service_context());
    let response = service.approve_listing(&auth.actor, listing_id).await?;
    Ok(ApiResponse::with_message(response, "Listing approved"))
}

/// POST /admin/listings/{listing_id}/reject
pub async fn reject_listing(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(listing_id): IdPath,
    body: OptionalValidatedJson<RejectListingRequest>,
) -> ApiResult<ApiResponse<ListingResponse>> {
    let service = ListingService::new(state.service_context());
    let response = service
        .reject_listing(&auth.actor, listing_id, body.into_inner_or_default())
        .await?;
    Ok(ApiResponse::with_message(response, "Listing rejected"))
}

/// POST /admin/listings/{listing_id}/take-down
pub async fn take_down_listing(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(listing_id): IdPath,
    body: OptionalValidatedJson<TakeDownRequest>,
) -> ApiResult<ApiResponse<TakeDownResponse>> {
    let service = ReportService::new(state.service_context());
    let response = service
        .take_down_listing(&auth.actor, listing_id, body.into_inner_or_default())
        .await?;
    Ok(ApiResponse::with_message(response, "Listing removed"))
}

// ============================================================================
// Reports
// ============================================================================

/// GET /admin/reports
pub async fn list_reports(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ReportQuery>,
    Pagination(page): Pagination,
) -> ApiResult<ApiResponse<PageResponse<ReportResponse>>> {
    let service = ReportService::new(state.service_context());
    let response = service.list_reports(&auth.actor, query, page).await?;
    Ok(ApiResponse::ok(response))
}

/// GET /admin/reports/stats
pub async fn report_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<ReportStatsResponse>> {
    let service = ReportService::new(state.service_context());
    let response = service.report_stats(&auth.actor).await?;
    Ok(ApiResponse::ok(response))
}

/// POST /admin/reports/bulk
pub async fn bulk_update_reports(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<BulkUpdateReportsRequest>,
) -> ApiResult<ApiResponse<BulkUpdateResponse>> {
    let service = ReportService::new(state.service_context());
    let response = service.bulk_update_report_status(&auth.actor, request).await?;
    let message = format!("{} reports updated", response.updated);
    Ok(ApiResponse::with_message(response, message))
}

/// GET /admin/reports/{report_id}
pub async fn get_report(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(report_id): IdPath,
) -> ApiResult<ApiResponse<ReportResponse>> {
    let service = ReportService::new(state.service_context());
    let response = service.get_report(&auth.actor, report_id).await?;
    Ok(ApiResponse::ok(response))
}

/// PATCH /admin/reports/{report_id}
pub async fn update_report(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(report_id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateReportRequest>,
) -> ApiResult<ApiResponse<ReportResponse>> {
    let service = ReportService::new(state.service_context());
    let response = service
        .update_report_status(&auth.actor, report_id, request)
        .await?;
    Ok(ApiResponse::ok(response))
}

// ============================================================================
// Users
// ============================================================================

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<UserQuery>,
    Pagination(page): Pagination,
) -> ApiResult<ApiResponse<PageResponse<UserResponse>>> {
    let service = UserService::new(state.service_context());
    let response = service.list_users(&auth.actor, query, page).await?;
    Ok(ApiResponse::ok(response))
}

/// PATCH /admin/users/{user_id}/role
pub async fn update_user_role(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateRoleRequest>,
) -> ApiResult<ApiResponse<UserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.update_user_role(&auth.actor, user_id, request).await?;
    Ok(ApiResponse::ok(response))
}

/// PATCH /admin/users/{user_id}/status
pub async fn update_user_status(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateStatusRequest>,
) -> ApiResult<ApiResponse<UserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service
        .update_user_status(&auth.actor, user_id, request)
        .await?;
    Ok(ApiResponse::ok(response))
}

// ============================================================================
// Maintenance and import
// ============================================================================

/// POST /admin/maintenance/sweep
pub async fn run_sweep(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<SweepResponse>> {
    let service = ListingService::new(state.service_context());
    let counts = service.sweep(&auth.actor).await?;
    Ok(ApiResponse::ok(SweepResponse::from(counts)))
}

/// POST /admin/import/preview
pub async fn preview_import(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<ImportRequest>,
) -> ApiResult<ApiResponse<ImportPreviewResponse>> {
    let service = ImportService::new(state.service_context());
    let response = service.preview_import(&auth.actor, request).await?;
    Ok(ApiResponse::ok(response))
}

/// POST /admin/import
pub async fn import_listings(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<ImportRequest>,
) -> ApiResult<Created<ApiResponse<ImportResultResponse>>> {
    let service = ImportService::new(state.service_context());
    let response = service.import_listings(&auth.actor, request).await?;
    Ok(Created(ApiResponse::ok(response)))
}
