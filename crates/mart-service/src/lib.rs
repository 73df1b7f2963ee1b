//! # mart-service
//!
//! Application layer: the listing lifecycle, moderation and reporting,
//! messaging, categories, favorites, accounts and the importer, plus the
//! DTOs the API speaks.

pub mod dto;
pub mod services;

pub use services::{
    AdminService, AuthService, CategoryService, ConversationService, FavoriteService,
    ImportService, ListingService, ReportService, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult, UserService,
};
