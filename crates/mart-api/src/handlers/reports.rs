//! Reporting endpoints for regular users

use axum::extract::State;
use mart_service::dto::{CreateReportRequest, PageResponse, ReportReasonsResponse, ReportResponse};
use mart_service::ReportService;

use crate::extractors::{AuthUser, IdPath, Pagination, ValidatedJson};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::state::AppState;

/// POST /listings/{listing_id}/reports
pub async fn report_listing(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(listing_id): IdPath,
    ValidatedJson(request): ValidatedJson<CreateReportRequest>,
) -> ApiResult<Created<ApiResponse<ReportResponse>>> {
    let service = ReportService::new(state.service_context());
    let response = service.submit_report(&auth.actor, listing_id, request).await?;
    Ok(Created(ApiResponse::with_message(
        response,
        "Report submitted, thank you",
    )))
}

/// GET /reports/mine
pub async fn my_reports(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
) -> ApiResult<ApiResponse<PageResponse<ReportResponse>>> {
    let service = ReportService::new(state.service_context());
    let response = service.my_reports(&auth.actor, page).await?;
    Ok(ApiResponse::ok(response))
}

/// GET /reports/reasons
pub async fn report_reasons(State(state): State<AppState>) -> ApiResponse<ReportReasonsResponse> {
    ApiResponse::ok(ReportService::new(state.service_context()).reasons())
}
