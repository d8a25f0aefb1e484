// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Auth Integration Tests
//!
//! Session issuance, validation, and invalidation through the full router:
//!
//! - `test_auth_*`: header parsing and the fixed 401 contract
//! - `test_login_*`: credential checks and token issuance
//! - `test_session_*`: expiry, blocking, and logout side effects

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};

use tally_store::AccessStore;
use tally_tests::common::{error_message, init_test_logging, TestApp};

// =============================================================================
// Header Contract
// =============================================================================

#[tokio::test]
async fn test_auth_missing_header() {
    init_test_logging();
    let app = TestApp::new();

    let (status, body) = app.get("/api/v1/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "Unauthorized! No Auth Header.");
}

#[tokio::test]
async fn test_auth_non_bearer_scheme() {
    init_test_logging();
    let app = TestApp::new();

    let (status, body) = app
        .get_with_raw_auth("/api/v1/users", "Basic dXNlcjpwdw==")
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_message(&body),
        "Unauthorized! Invalid authorization header."
    );
}

#[tokio::test]
async fn test_auth_unknown_token() {
    init_test_logging();
    let app = TestApp::new();

    let (status, body) = app.get("/api/v1/users", Some("no-such-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_message(&body),
        "Unauthorized! Expired Token; Log out and log in again."
    );
}

#[tokio::test]
async fn test_auth_health_is_public() {
    init_test_logging();
    let app = TestApp::new();

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_issues_bearer_token() {
    init_test_logging();
    let app = TestApp::new();
    let group = app.super_group_id().await;
    app.seed_user("kit", Some(group), &[]).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(serde_json::json!({ "username": "kit", "password": "pw" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["expires_at"].as_str().is_some());
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    init_test_logging();
    let app = TestApp::new();
    app.seed_user("kit", None, &[]).await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(serde_json::json!({ "username": "kit", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_blocked_user() {
    init_test_logging();
    let app = TestApp::new();
    let user = app.seed_user("kit", None, &[]).await;
    app.store.set_user_blocked(user.id, true).await.unwrap();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(serde_json::json!({ "username": "kit", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "Unauthorized! User is blocked.");
}

// =============================================================================
// Session Lifecycle
// =============================================================================

#[tokio::test]
async fn test_session_me_returns_principal() {
    init_test_logging();
    let app = TestApp::new();
    let group = app.super_group_id().await;
    app.seed_user("kit", Some(group), &[]).await;
    let token = app.login("kit").await;

    let (status, body) = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "kit");
    assert_eq!(body["rank"], 0);
    // Effective permissions come back in normalized clearance-record form.
    assert!(body["permissions"]
        .as_array()
        .is_some_and(|records| records.iter().all(|r| r["clearance"].is_string())));
}

#[tokio::test]
async fn test_session_expired_token_is_cleared() {
    init_test_logging();
    let app = TestApp::new();
    let user = app.seed_user("kit", None, &[]).await;

    app.store
        .insert_session(
            user.id,
            "stale-token".to_string(),
            Utc::now() - Duration::minutes(1),
        )
        .await
        .unwrap();

    let (status, body) = app.get("/api/v1/auth/me", Some("stale-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_message(&body),
        "Unauthorized! Expired Token; Log out and log in again."
    );

    // The token was cleared server-side, so the row can never match again.
    assert!(app.store.find_session("stale-token").await.unwrap().is_none());
}

#[tokio::test]
async fn test_session_blocked_user_is_rejected_and_token_cleared() {
    init_test_logging();
    let app = TestApp::new();
    let user = app.seed_user("kit", None, &[]).await;
    let token = app.login("kit").await;

    app.store.set_user_blocked(user.id, true).await.unwrap();

    let (status, body) = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "Unauthorized! User is blocked.");
    assert!(app.store.find_session(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_session_logout_invalidates_token() {
    init_test_logging();
    let app = TestApp::new();
    app.seed_user("kit", None, &[]).await;
    let token = app.login("kit").await;

    let (status, body) = app
        .request(Method::POST, "/api/v1/auth/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_message(&body),
        "Unauthorized! Expired Token; Log out and log in again."
    );
}

#[tokio::test]
async fn test_session_expired_membership_drops_rank() {
    init_test_logging();
    let app = TestApp::new();
    let group = app.super_group_id().await;
    let user = app.seed_user("kit", Some(group), &[]).await;
    let token = app.login("kit").await;

    app.store
        .set_user_group_expiration(user.id, Some(Utc::now() - Duration::hours(1)))
        .await
        .unwrap();

    let (status, body) = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    // Rank is group-derived and lapses with the membership, as do the
    // group-level permission grants.
    assert!(body.get("rank").is_none() || body["rank"].is_null());
    assert_eq!(body["permissions"], serde_json::json!([]));
}
