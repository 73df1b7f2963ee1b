mod support;

use chrono::{Duration, Utc};
use mart_core::{DomainError, ListingStatus, PageRequest, UserRole, DEFAULT_REJECTION_REASON};
use mart_service::dto::{
    BoostRequest, ChangeStatusRequest, CreateListingRequest, ListingQuery, MyListingsQuery,
    RejectListingRequest, UpdateListingRequest,
};
use mart_service::{ListingService, ServiceError};
use serde_json::json;
use support::{settle, TestApp};

fn create_request(title: &str) -> CreateListingRequest {
    serde_json::from_value(json!({
        "title": title,
        "description": "Barely used, 21 gears, new tyres",
        "price": "250",
        "location": "Baku",
    }))
    .unwrap()
}

fn update_request(value: serde_json::Value) -> UpdateListingRequest {
    serde_json::from_value(value).unwrap()
}

fn status(value: &str) -> ChangeStatusRequest {
    serde_json::from_value(json!({ "status": value })).unwrap()
}

#[tokio::test]
async fn red_bicycle_from_draft_to_sold() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let admin = app.user("Rauf", UserRole::Admin);
    let buyer = app.user("Elvin", UserRole::User);
    let service = ListingService::new(&app.ctx);

    let created = service
        .create_listing(&seller, create_request("Red Bicycle"))
        .await
        .unwrap();
    assert_eq!(created.status, ListingStatus::Pending);
    assert_eq!(created.slug, "red-bicycle");
    assert!(created.expiry_date.is_none());

    // Pending listings are invisible to the public
    let err = service.get_listing(None, created.id).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
    let err = service.get_listing(Some(&buyer), created.id).await.unwrap_err();
    assert_eq!(err.status_code(), 404);

    let approved = service.approve_listing(&admin, created.id).await.unwrap();
    assert_eq!(approved.status, ListingStatus::Active);
    let expiry = approved.expiry_date.unwrap();
    assert!(expiry > Utc::now() + Duration::days(29));

    let seen = service.get_listing(Some(&buyer), created.id).await.unwrap();
    assert_eq!(seen.views, 1);
    settle().await;
    assert_eq!(app.store.listing(created.id).unwrap().views, 1);

    let by_slug = service.get_listing_by_slug(None, "red-bicycle").await.unwrap();
    assert_eq!(by_slug.id, created.id);

    let sold = service.mark_as_sold(&seller, created.id).await.unwrap();
    assert_eq!(sold.status, ListingStatus::Sold);

    let public = service
        .search_listings(None, ListingQuery::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(public.total, 0);
}

#[tokio::test]
async fn owner_views_are_not_counted() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let listing = app.listing(&seller, "Oak Desk", ListingStatus::Active);
    let service = ListingService::new(&app.ctx);

    let own = service.get_listing(Some(&seller), listing.id).await.unwrap();
    assert_eq!(own.views, 0);
    settle().await;
    assert_eq!(app.store.listing(listing.id).unwrap().views, 0);

    service.get_listing(None, listing.id).await.unwrap();
    service.get_listing(None, listing.id).await.unwrap();
    settle().await;
    assert_eq!(app.store.listing(listing.id).unwrap().views, 2);
}

#[tokio::test]
async fn editing_a_rejected_listing_resubmits_it() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let admin = app.user("Rauf", UserRole::Admin);
    let listing = app.listing(&seller, "Vintage Lamp", ListingStatus::Pending);
    let service = ListingService::new(&app.ctx);

    let rejected = service
        .reject_listing(&admin, listing.id, RejectListingRequest::default())
        .await
        .unwrap();
    assert_eq!(rejected.status, ListingStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some(DEFAULT_REJECTION_REASON));

    let edited = service
        .update_listing(
            &seller,
            listing.id,
            update_request(json!({ "title": "Vintage Brass Lamp" })),
        )
        .await
        .unwrap();
    assert_eq!(edited.status, ListingStatus::Pending);
    assert!(edited.rejection_reason.is_none());
    assert_eq!(edited.title, "Vintage Brass Lamp");
    assert_eq!(edited.slug, listing.slug);
}

#[tokio::test]
async fn only_admins_moderate() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let stranger = app.user("Nigar", UserRole::User);
    let listing = app.listing(&seller, "Sofa", ListingStatus::Pending);
    let service = ListingService::new(&app.ctx);

    let err = service.approve_listing(&seller, listing.id).await.unwrap_err();
    assert_eq!(err.status_code(), 403);

    let err = service
        .change_listing_status(&seller, listing.id, status("active"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    let err = service
        .update_listing(&stranger, listing.id, update_request(json!({ "price": "10" })))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::NotListingOwner)));

    let err = service
        .change_listing_status(&seller, listing.id, status("rejected"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn sold_listings_can_only_be_deleted_by_their_owner() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let admin = app.user("Rauf", UserRole::Admin);
    let listing = app.listing(&seller, "Camera", ListingStatus::Active);
    let service = ListingService::new(&app.ctx);

    let err = service.mark_as_sold(&admin, listing.id).await.unwrap_err();
    assert_eq!(err.status_code(), 403);

    service.mark_as_sold(&seller, listing.id).await.unwrap();
    let err = service
        .change_listing_status(&seller, listing.id, status("active"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::InvalidTransition { .. })
    ));

    let deleted = service
        .change_listing_status(&seller, listing.id, status("deleted"))
        .await
        .unwrap();
    assert_eq!(deleted.status, ListingStatus::Deleted);

    let err = service.delete_listing(&seller, listing.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::ListingAlreadyDeleted)));

    // Admins still see deleted listings
    let shown = service.get_listing(Some(&admin), listing.id).await.unwrap();
    assert_eq!(shown.status, ListingStatus::Deleted);
    let err = service.get_listing(Some(&seller), listing.id).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn duplicate_titles_get_distinct_slugs() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let service = ListingService::new(&app.ctx);

    let first = service
        .create_listing(&seller, create_request("Gaming Laptop"))
        .await
        .unwrap();
    let second = service
        .create_listing(&seller, create_request("Gaming Laptop"))
        .await
        .unwrap();

    assert_eq!(first.slug, "gaming-laptop");
    assert_ne!(second.slug, first.slug);
    assert!(second.slug.starts_with("gaming-laptop-"));
}

#[tokio::test]
async fn sweep_clears_elapsed_boosts_and_expires() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let admin = app.user("Rauf", UserRole::Admin);
    let listing = app.listing(&seller, "Piano", ListingStatus::Active);
    let service = ListingService::new(&app.ctx);

    let boost: BoostRequest = serde_json::from_value(json!({ "duration": "week" })).unwrap();
    let featured = service.feature_listing(&admin, listing.id, boost).await.unwrap();
    assert!(featured.is_featured);
    assert_eq!(service.featured_listings(None).await.unwrap().len(), 1);

    let later = Utc::now() + Duration::days(31);
    let counts = service.run_maintenance(later).await.unwrap();
    assert_eq!(counts.featured_cleared, 1);
    assert_eq!(counts.promotions_cleared, 0);
    assert_eq!(counts.listings_expired, 1);

    let stored = app.store.listing(listing.id).unwrap();
    assert!(!stored.is_featured);
    assert_eq!(stored.status, ListingStatus::Expired);

    // A second pass finds nothing left to do
    let again = service.run_maintenance(later).await.unwrap();
    assert_eq!(again, Default::default());

    let err = service.sweep(&seller).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn featured_flag_without_end_date_is_cleared() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let mut listing = app.listing(&seller, "Guitar", ListingStatus::Active);
    listing.is_featured = true;
    listing.featured_until = None;
    app.store.put_listing(listing.clone());

    let service = ListingService::new(&app.ctx);
    assert!(service.featured_listings(None).await.unwrap().is_empty());
    let counts = service.run_maintenance(Utc::now()).await.unwrap();
    assert_eq!(counts.featured_cleared, 1);
}

#[tokio::test]
async fn search_filters_and_status_visibility() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let admin = app.user("Rauf", UserRole::Admin);
    app.listing(&seller, "Road Bicycle", ListingStatus::Active);
    app.listing(&seller, "Kitchen Table", ListingStatus::Active);
    app.listing(&seller, "Mountain Bicycle", ListingStatus::Pending);
    let service = ListingService::new(&app.ctx);

    let query: ListingQuery = serde_json::from_value(json!({ "q": "bicycle" })).unwrap();
    let found = service
        .search_listings(None, query, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.items[0].title, "Road Bicycle");

    let pending: ListingQuery = serde_json::from_value(json!({ "status": "pending" })).unwrap();
    let err = service
        .search_listings(Some(&seller), pending.clone(), PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
    let queue = service
        .search_listings(Some(&admin), pending, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(queue.total, 1);

    let inverted: ListingQuery =
        serde_json::from_value(json!({ "min_price": "500", "max_price": "100" })).unwrap();
    let err = service
        .search_listings(None, inverted, PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn my_listings_include_every_live_status() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let other = app.user("Nigar", UserRole::User);
    app.listing(&seller, "Chair", ListingStatus::Active);
    app.listing(&seller, "Stool", ListingStatus::Pending);
    app.listing(&seller, "Bench", ListingStatus::Deleted);
    app.listing(&other, "Rug", ListingStatus::Active);
    let service = ListingService::new(&app.ctx);

    let mine = service
        .my_listings(&seller, MyListingsQuery::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(mine.total, 2);

    let deleted: MyListingsQuery = serde_json::from_value(json!({ "status": "deleted" })).unwrap();
    let err = service
        .my_listings(&seller, deleted, PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn promotion_needs_a_valid_duration() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let listing = app.listing(&seller, "Scooter", ListingStatus::Active);
    let service = ListingService::new(&app.ctx);

    let bad: BoostRequest = serde_json::from_value(json!({ "days": 45 })).unwrap();
    let err = service.promote_listing(&seller, listing.id, bad).await.unwrap_err();
    assert_eq!(err.status_code(), 400);

    let ok: BoostRequest = serde_json::from_value(json!({ "days": 3 })).unwrap();
    let promoted = service.promote_listing(&seller, listing.id, ok).await.unwrap();
    assert!(promoted.is_promoted);
    let ends = promoted.promotion_end_date.unwrap();
    assert!(ends > Utc::now() + Duration::days(2));
}
