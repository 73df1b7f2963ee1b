//! Route definitions
//!
//! Everything except the health probes is mounted under `/api/v1`.

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{
    admin, auth, categories, conversations, favorites, health, listings, reports, users,
};
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";

/// API router, without the health probes
pub fn create_router() -> Router<AppState> {
    Router::new().nest(API_PREFIX, api_v1_routes())
}

/// Health check routes (kept apart so they bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(listing_routes())
        .merge(category_routes())
        .merge(conversation_routes())
        .merge(favorite_routes())
        .merge(report_routes())
        .merge(admin_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/me",
            get(users::get_current_user).patch(users::update_current_user),
        )
        .route("/users/me/listings", get(users::my_listings))
        .route("/users/:user_id", get(users::get_user))
}

fn listing_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/listings",
            get(listings::search_listings).post(listings::create_listing),
        )
        .route("/listings/featured", get(listings::featured_listings))
        .route("/listings/slug/:slug", get(listings::get_listing_by_slug))
        .route(
            "/listings/:listing_id",
            get(listings::get_listing)
                .patch(listings::update_listing)
                .delete(listings::delete_listing),
        )
        .route("/listings/:listing_id/status", patch(listings::change_status))
        .route("/listings/:listing_id/sold", post(listings::mark_sold))
        .route("/listings/:listing_id/promote", post(listings::promote_listing))
        .route("/listings/:listing_id/feature", post(listings::feature_listing))
        .route("/listings/:listing_id/reports", post(reports::report_listing))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/categories/tree", get(categories::category_tree))
        .route("/categories/slug/:slug", get(categories::get_category_by_slug))
        .route(
            "/categories/:category_id",
            get(categories::get_category)
                .patch(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/categories/:category_id/children",
            get(categories::get_children),
        )
}

fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/conversations",
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route("/conversations/unread", get(conversations::unread_summary))
        .route(
            "/conversations/:conversation_id",
            get(conversations::get_conversation),
        )
        .route(
            "/conversations/:conversation_id/messages",
            get(conversations::get_messages).post(conversations::send_message),
        )
        .route(
            "/conversations/:conversation_id/read",
            post(conversations::mark_as_read),
        )
        .route(
            "/conversations/:conversation_id/archive",
            post(conversations::archive).delete(conversations::unarchive),
        )
}

fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/favorites",
            get(favorites::list_favorites).post(favorites::add_favorite),
        )
        .route(
            "/favorites/:item_type/:item_id",
            get(favorites::is_favorite).delete(favorites::remove_favorite),
        )
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports/mine", get(reports::my_reports))
        .route("/reports/reasons", get(reports::report_reasons))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(admin::dashboard_stats))
        // Listing moderation
        .route("/admin/listings", get(admin::list_listings))
        .route(
            "/admin/listings/:listing_id/approve",
            post(admin::approve_listing),
        )
        .route(
            "/admin/listings/:listing_id/reject",
            post(admin::reject_listing),
        )
        .route(
            "/admin/listings/:listing_id/take-down",
            post(admin::take_down_listing),
        )
        // Reports
        .route("/admin/reports", get(admin::list_reports))
        .route("/admin/reports/stats", get(admin::report_stats))
        .route("/admin/reports/bulk", post(admin::bulk_update_reports))
        .route(
            "/admin/reports/:report_id",
            get(admin::get_report).patch(admin::update_report),
        )
        // Users
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:user_id/role", patch(admin::update_user_role))
        .route(
            "/admin/users/:user_id/status",
            patch(admin::update_user_status),
        )
        // Maintenance and import
        .route("/admin/maintenance/sweep", post(admin::run_sweep))
        .route("/admin/import/preview", post(admin::preview_import))
        .route("/admin/import", post(admin::import_listings))
}
