//! Buyer/seller messaging endpoints

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use mart_service::dto::{
    ConversationQuery, ConversationResponse, CreateConversationRequest, MarkReadResponse,
    MessageResponse, PageResponse, SendMessageRequest, UnreadSummaryResponse,
};
use mart_service::ConversationService;

use crate::extractors::{AuthUser, IdPath, Pagination, QueryParams, ValidatedJson};
use crate::response::{ApiResponse, ApiResult, Created};
use crate::state::AppState;

/// GET /conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ConversationQuery>,
    Pagination(page): Pagination,
) -> ApiResult<ApiResponse<PageResponse<ConversationResponse>>> {
    let service = ConversationService::new(state.service_context());
    let response = service.list_conversations(&auth.actor, query, page).await?;
    Ok(ApiResponse::ok(response))
}

/// POST /conversations
///
/// 201 for a new thread, 200 when an existing one was reused.
pub async fn create_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateConversationRequest>,
) -> ApiResult<Response> {
    let service = ConversationService::new(state.service_context());
    let started = service.create_conversation(&auth.actor, request).await?;

    if started.reused {
        Ok(ApiResponse::ok(started).into_response())
    } else {
        Ok(Created(ApiResponse::ok(started)).into_response())
    }
}

/// GET /conversations/unread
pub async fn unread_summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<UnreadSummaryResponse>> {
    let service = ConversationService::new(state.service_context());
    let response = service.unread_summary(&auth.actor).await?;
    Ok(ApiResponse::ok(response))
}

/// GET /conversations/{conversation_id}
pub async fn get_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(conversation_id): IdPath,
) -> ApiResult<ApiResponse<ConversationResponse>> {
    let service = ConversationService::new(state.service_context());
    let response = service.get_conversation(&auth.actor, conversation_id).await?;
    Ok(ApiResponse::ok(response))
}

/// GET /conversations/{conversation_id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(conversation_id): IdPath,
    Pagination(page): Pagination,
) -> ApiResult<ApiResponse<PageResponse<MessageResponse>>> {
    let service = ConversationService::new(state.service_context());
    let response = service
        .get_messages(&auth.actor, conversation_id, page)
        .await?;
    Ok(ApiResponse::ok(response))
}

/// POST /conversations/{conversation_id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(conversation_id): IdPath,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> ApiResult<Created<ApiResponse<MessageResponse>>> {
    let service = ConversationService::new(state.service_context());
    let response = service
        .send_message(&auth.actor, conversation_id, request)
        .await?;
    Ok(Created(ApiResponse::ok(response)))
}

/// POST /conversations/{conversation_id}/read
pub async fn mark_as_read(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(conversation_id): IdPath,
) -> ApiResult<ApiResponse<MarkReadResponse>> {
    let service = ConversationService::new(state.service_context());
    let response = service.mark_as_read(&auth.actor, conversation_id).await?;
    Ok(ApiResponse::ok(response))
}

/// POST /conversations/{conversation_id}/archive
pub async fn archive(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(conversation_id): IdPath,
) -> ApiResult<ApiResponse<()>> {
    let service = ConversationService::new(state.service_context());
    service.archive(&auth.actor, conversation_id).await?;
    Ok(ApiResponse::message("Conversation archived"))
}

/// DELETE /conversations/{conversation_id}/archive
pub async fn unarchive(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(conversation_id): IdPath,
) -> ApiResult<ApiResponse<()>> {
    let service = ConversationService::new(state.service_context());
    service.unarchive(&auth.actor, conversation_id).await?;
    Ok(ApiResponse::message("Conversation restored"))
}
