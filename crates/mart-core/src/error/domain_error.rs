//! Domain errors - every rule violation the engines can raise

use thiserror::Error;

use crate::entities::ListingStatus;
use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Listing not found: {0}")]
    ListingNotFound(Snowflake),

    #[error("Listing not found: {0}")]
    ListingSlugNotFound(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(Snowflake),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(Snowflake),

    #[error("Report not found: {0}")]
    ReportNotFound(Snowflake),

    #[error("Favorite not found")]
    FavoriteNotFound,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Cannot change listing status from {from} to {to}")]
    InvalidTransition { from: ListingStatus, to: ListingStatus },

    #[error("Listing is not active")]
    ListingNotActive,

    #[error("Listing is already deleted")]
    ListingAlreadyDeleted,

    #[error("You have already reported this listing")]
    AlreadyReported,

    #[error("You cannot message yourself")]
    CannotMessageSelf,

    #[error("Category has subcategories and cannot be deleted")]
    CategoryHasChildren,

    #[error("A category cannot be its own ancestor")]
    CategoryCycle,

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("You do not have permission to modify this listing")]
    NotListingOwner,

    #[error("You are not a participant in this conversation")]
    NotParticipant,

    #[error("{0}")]
    Forbidden(String),

    #[error("Account is not active")]
    AccountInactive,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Slug already in use: {0}")]
    SlugAlreadyExists(String),

    #[error("Item is already in favorites")]
    FavoriteAlreadyExists,

    #[error("A conversation between these users already exists")]
    ConversationAlreadyExists,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Shorthand for the generic 403
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Shorthand for the generic 400
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::ListingNotFound(_) | Self::ListingSlugNotFound(_) => "LISTING_NOT_FOUND",
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            Self::ConversationNotFound(_) => "CONVERSATION_NOT_FOUND",
            Self::ReportNotFound(_) => "REPORT_NOT_FOUND",
            Self::FavoriteNotFound => "FAVORITE_NOT_FOUND",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ListingNotActive => "LISTING_NOT_ACTIVE",
            Self::ListingAlreadyDeleted => "LISTING_ALREADY_DELETED",
            Self::AlreadyReported => "ALREADY_REPORTED",
            Self::CannotMessageSelf => "CANNOT_MESSAGE_SELF",
            Self::CategoryHasChildren => "CATEGORY_HAS_CHILDREN",
            Self::CategoryCycle => "CATEGORY_CYCLE",
            Self::WeakPassword(_) => "WEAK_PASSWORD",

            // Authorization
            Self::NotListingOwner => "NOT_LISTING_OWNER",
            Self::NotParticipant => "NOT_PARTICIPANT",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::AccountInactive => "ACCOUNT_INACTIVE",

            // Conflict
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::SlugAlreadyExists(_) => "SLUG_ALREADY_EXISTS",
            Self::FavoriteAlreadyExists => "FAVORITE_ALREADY_EXISTS",
            Self::ConversationAlreadyExists => "CONVERSATION_ALREADY_EXISTS",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::ListingNotFound(_)
                | Self::ListingSlugNotFound(_)
                | Self::CategoryNotFound(_)
                | Self::ConversationNotFound(_)
                | Self::ReportNotFound(_)
                | Self::FavoriteNotFound
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidStatus(_)
                | Self::InvalidTransition { .. }
                | Self::ListingNotActive
                | Self::ListingAlreadyDeleted
                | Self::AlreadyReported
                | Self::CannotMessageSelf
                | Self::CategoryHasChildren
                | Self::CategoryCycle
                | Self::WeakPassword(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotListingOwner | Self::NotParticipant | Self::Forbidden(_) | Self::AccountInactive
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists
                | Self::SlugAlreadyExists(_)
                | Self::FavoriteAlreadyExists
                | Self::ConversationAlreadyExists
        )
    }
}
