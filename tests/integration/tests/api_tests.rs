//! API integration tests
//!
//! Requires a PostgreSQL instance and `DATABASE_URL` plus `JWT_SECRET`.
//! Without them every test returns early.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    category_payload, check_test_env, expect_data, expect_error, listing_payload, str_field,
    unique_suffix, TestServer,
};
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_probes() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health", None).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let response = server.get("/health/ready", None).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_register_login_and_duplicates() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user = server.register("Leyla").await.unwrap();
    assert!(!user.token.is_empty());

    let duplicate = json!({
        "email": user.email.to_uppercase(),
        "password": "bazaar2024",
        "first_name": "Leyla",
        "last_name": "Again",
    });
    let response = server.post("/auth/register", None, &duplicate).await.unwrap();
    expect_error(response, StatusCode::CONFLICT).await.unwrap();

    let response = server.login(&user.email).await.unwrap();
    let session = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(session["token_type"], "Bearer");
    assert!(session["user"]["last_login"].is_string());

    let wrong = json!({ "email": user.email, "password": "wrong-pass1" });
    let response = server.post("/auth/login", None, &wrong).await.unwrap();
    expect_error(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server.get("/users/me", Some(&user.token)).await.unwrap();
    let me = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(me["id"], user.id.as_str());
    assert_eq!(me["role"], "user");
}

// ============================================================================
// Listing lifecycle
// ============================================================================

#[tokio::test]
async fn test_red_bicycle_lifecycle() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let seller = server.register("Aysel").await.unwrap();
    let buyer = server.register("Elvin").await.unwrap();
    let admin = server.register_with_role("Rauf", "admin").await.unwrap();

    let title = format!("Red Bicycle {}", unique_suffix());
    let response = server
        .post("/listings", Some(&seller.token), &listing_payload(&title))
        .await
        .unwrap();
    let listing = expect_data(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(listing["status"], "pending");
    assert!(str_field(&listing, "slug").unwrap().starts_with("red-bicycle-"));
    let id = str_field(&listing, "id").unwrap();

    // Pending listings are invisible to the public
    let response = server.get(&format!("/listings/{id}"), None).await.unwrap();
    expect_error(response, StatusCode::NOT_FOUND).await.unwrap();

    // The owner cannot self-approve
    let response = server
        .patch(
            &format!("/listings/{id}/status"),
            &seller.token,
            &json!({ "status": "active" }),
        )
        .await
        .unwrap();
    expect_error(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post(&format!("/admin/listings/{id}/approve"), Some(&admin.token), &json!({}))
        .await
        .unwrap();
    let approved = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(approved["status"], "active");
    assert!(approved["expiry_date"].is_string());

    let response = server
        .get(&format!("/listings/{id}"), Some(&buyer.token))
        .await
        .unwrap();
    let viewed = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(viewed["views"], 1);

    // Only the owner may mark it sold
    let response = server
        .post(&format!("/listings/{id}/sold"), Some(&buyer.token), &json!({}))
        .await
        .unwrap();
    expect_error(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post(&format!("/listings/{id}/sold"), Some(&seller.token), &json!({}))
        .await
        .unwrap();
    let sold = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(sold["status"], "sold");

    let response = server
        .get(&format!("/listings?q={}", title.replace(' ', "+")), None)
        .await
        .unwrap();
    let page = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(page["total"], 0);

    let response = server
        .get("/users/me/listings", Some(&seller.token))
        .await
        .unwrap();
    let mine = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(mine["total"], 1);
    assert_eq!(mine["current_page"], 1);
}

// ============================================================================
// Moderation
// ============================================================================

#[tokio::test]
async fn test_duplicate_report_until_resolved() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let seller = server.register("Aysel").await.unwrap();
    let reporter = server.register("Nigar").await.unwrap();
    let admin = server.register_with_role("Rauf", "admin").await.unwrap();

    let response = server
        .post("/listings", Some(&seller.token), &listing_payload("Designer Bag"))
        .await
        .unwrap();
    let id = str_field(&expect_data(response, StatusCode::CREATED).await.unwrap(), "id").unwrap();
    let response = server
        .post(&format!("/admin/listings/{id}/approve"), Some(&admin.token), &json!({}))
        .await
        .unwrap();
    expect_data(response, StatusCode::OK).await.unwrap();

    let report = json!({ "reason": "Fake or fraudulent listing" });
    let path = format!("/listings/{id}/reports");

    let response = server.post(&path, Some(&reporter.token), &report).await.unwrap();
    let created = expect_data(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(created["status"], "pending");
    let report_id = str_field(&created, "id").unwrap();

    let response = server.post(&path, Some(&reporter.token), &report).await.unwrap();
    let code = expect_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "ALREADY_REPORTED");

    // Regular users cannot see the moderation queue
    let response = server.get("/admin/reports", Some(&reporter.token)).await.unwrap();
    expect_error(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .patch(
            &format!("/admin/reports/{report_id}"),
            &admin.token,
            &json!({ "status": "resolved", "action_taken": "warned_seller" }),
        )
        .await
        .unwrap();
    let resolved = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(resolved["status"], "resolved");

    let response = server.post(&path, Some(&reporter.token), &report).await.unwrap();
    expect_data(response, StatusCode::CREATED).await.unwrap();

    // The listing itself is untouched by report decisions
    let response = server.get(&format!("/listings/{id}"), None).await.unwrap();
    let listing = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(listing["status"], "active");
}

// ============================================================================
// Messaging
// ============================================================================

#[tokio::test]
async fn test_is_this_available_conversation() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let seller = server.register("Aysel").await.unwrap();
    let buyer = server.register("Elvin").await.unwrap();
    let admin = server.register_with_role("Rauf", "admin").await.unwrap();

    let response = server
        .post("/listings", Some(&seller.token), &listing_payload("Mountain Bike"))
        .await
        .unwrap();
    let listing_id =
        str_field(&expect_data(response, StatusCode::CREATED).await.unwrap(), "id").unwrap();
    let response = server
        .post(
            &format!("/admin/listings/{listing_id}/approve"),
            Some(&admin.token),
            &json!({}),
        )
        .await
        .unwrap();
    expect_data(response, StatusCode::OK).await.unwrap();

    let opener = json!({
        "recipient_id": seller.id,
        "listing_id": listing_id,
        "message": "Is this available?",
    });
    let response = server
        .post("/conversations", Some(&buyer.token), &opener)
        .await
        .unwrap();
    let started = expect_data(response, StatusCode::CREATED).await.unwrap();
    let conversation_id = str_field(&started["conversation"], "id").unwrap();

    // Same buyer, seller and listing: same thread
    let response = server
        .post("/conversations", Some(&buyer.token), &opener)
        .await
        .unwrap();
    let reused = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(reused["reused"], true);
    assert_eq!(reused["conversation"]["id"], conversation_id.as_str());

    let response = server
        .get("/conversations/unread", Some(&seller.token))
        .await
        .unwrap();
    let unread = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread["total_unread"], 2);

    let response = server
        .post(
            &format!("/conversations/{conversation_id}/messages"),
            Some(&seller.token),
            &json!({ "content": "Yes, come by after six" }),
        )
        .await
        .unwrap();
    expect_data(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post(
            &format!("/conversations/{conversation_id}/read"),
            Some(&seller.token),
            &json!({}),
        )
        .await
        .unwrap();
    let read = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(read["messages_read"], 2);

    let response = server
        .get(&format!("/conversations/{conversation_id}"), Some(&buyer.token))
        .await
        .unwrap();
    let buyer_view = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(buyer_view["unread_count"], 1);

    let response = server
        .get(
            &format!("/conversations/{conversation_id}/messages"),
            Some(&admin.token),
        )
        .await
        .unwrap();
    expect_error(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
async fn test_category_deletion_outcomes() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let admin = server.register_with_role("Rauf", "admin").await.unwrap();
    let seller = server.register("Aysel").await.unwrap();

    let response = server
        .post("/categories", Some(&seller.token), &category_payload("Garden"))
        .await
        .unwrap();
    expect_error(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post("/categories", Some(&admin.token), &category_payload("Electronics"))
        .await
        .unwrap();
    let parent = str_field(&expect_data(response, StatusCode::CREATED).await.unwrap(), "id").unwrap();

    let mut phones = category_payload("Phones");
    phones["parent_id"] = json!(parent);
    let response = server
        .post("/categories", Some(&admin.token), &phones)
        .await
        .unwrap();
    let child = str_field(&expect_data(response, StatusCode::CREATED).await.unwrap(), "id").unwrap();

    let mut listing = listing_payload("Old Phone");
    listing["category_id"] = json!(child);
    let response = server
        .post("/listings", Some(&seller.token), &listing)
        .await
        .unwrap();
    expect_data(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .delete(&format!("/categories/{parent}"), &admin.token)
        .await
        .unwrap();
    expect_error(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .delete(&format!("/categories/{child}"), &admin.token)
        .await
        .unwrap();
    let outcome = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(outcome, "deactivated");

    let response = server
        .get(&format!("/categories/{parent}/children"), None)
        .await
        .unwrap();
    let children = expect_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(children.as_array().unwrap().len(), 0);
}

// ============================================================================
// Admin gates
// ============================================================================

#[tokio::test]
async fn test_admin_routes_refuse_regular_users() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user = server.register("Elvin").await.unwrap();
    let admin = server.register_with_role("Rauf", "admin").await.unwrap();

    for path in ["/admin/stats", "/admin/users", "/admin/reports/stats"] {
        let response = server.get(path, Some(&user.token)).await.unwrap();
        expect_error(response, StatusCode::FORBIDDEN).await.unwrap();
    }

    let response = server
        .post("/admin/maintenance/sweep", Some(&user.token), &json!({}))
        .await
        .unwrap();
    expect_error(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post("/admin/maintenance/sweep", Some(&admin.token), &json!({}))
        .await
        .unwrap();
    let counts = expect_data(response, StatusCode::OK).await.unwrap();
    assert!(counts["listings_expired"].is_u64());

    let response = server.get("/admin/stats", Some(&admin.token)).await.unwrap();
    let stats = expect_data(response, StatusCode::OK).await.unwrap();
    assert!(stats["total_users"].as_i64().unwrap() >= 2);

    // An admin cannot hand out admin rights
    let response = server
        .patch(
            &format!("/admin/users/{}/role", user.id),
            &admin.token,
            &json!({ "role": "admin" }),
        )
        .await
        .unwrap();
    expect_error(response, StatusCode::FORBIDDEN).await.unwrap();
}
