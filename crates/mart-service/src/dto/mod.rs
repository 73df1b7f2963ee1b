//! Data transfer objects for API requests and responses
//!
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    AddFavoriteRequest, BoostRequest, BulkUpdateReportsRequest, CategoryQuery, ChangeStatusRequest,
    ConversationQuery, CreateCategoryRequest, CreateConversationRequest, CreateListingRequest,
    CreateReportRequest, FavoriteQuery, FeaturedQuery, ImportRequest, ListingQuery, LoginRequest,
    MyListingsQuery, RefreshTokenRequest, RegisterRequest, RejectListingRequest, ReportQuery,
    SendMessageRequest, TakeDownRequest, UpdateCategoryRequest, UpdateListingRequest,
    UpdateProfileRequest, UpdateReportRequest, UpdateRoleRequest, UpdateStatusRequest, UserQuery,
};

pub use responses::{
    AuthResponse, BulkUpdateResponse, CategoryDeletion, CategoryResponse, CategoryTreeResponse,
    ConversationResponse, ConversationStartedResponse, DailyCount, DashboardStatsResponse,
    FavoriteResponse, FavoriteStatusResponse, HealthResponse, ImportFailure,
    ImportPreviewResponse, ImportResultResponse, ListingResponse, ListingSummary,
    MarkReadResponse, MessageResponse, PageResponse, PublicUserResponse, ReadinessResponse,
    ReasonCount, ReportReasonsResponse, ReportResponse, ReportStatsResponse, SweepResponse,
    TakeDownResponse, TokenResponse, UnreadSummaryResponse, UserResponse,
};
