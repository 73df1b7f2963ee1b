//! Registration, login and token refresh

use axum::extract::State;
use mart_service::dto::{
    AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, TokenResponse,
};
use mart_service::AuthService;

use crate::extractors::ValidatedJson;
use crate::response::{ApiResponse, ApiResult, Created};
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<Created<ApiResponse<AuthResponse>>> {
    let service = AuthService::new(state.service_context());
    let response = service.register(request).await?;
    Ok(Created(ApiResponse::with_message(response, "Registration successful")))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<ApiResponse<AuthResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.login(request).await?;
    Ok(ApiResponse::ok(response))
}

/// POST /auth/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RefreshTokenRequest>,
) -> ApiResult<ApiResponse<TokenResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.refresh(request).await?;
    Ok(ApiResponse::ok(response))
}
