// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Drives the full axum router in-process against an in-memory store.
//! Requests go through the real middleware stack, so every test exercises
//! session validation exactly as a deployed server would.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tally_api::{ApiConfig, ApiServer, AppState};
use tally_core::{Group, User};
use tally_store::{AccessStore, MemoryStore, NewGroup, NewUser};

// =============================================================================
// TestApp
// =============================================================================

/// A fully wired API instance over a seeded in-memory store.
pub struct TestApp {
    /// The backing store, for direct seeding and white-box assertions.
    pub store: Arc<MemoryStore>,
    router: Router,
}

impl TestApp {
    /// Creates an app over a store seeded with the default catalog and the
    /// "Super User" group.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::with_defaults());
        let state = AppState::new(ApiConfig::default(), store.clone());
        let router = ApiServer::new(state).router();
        Self { store, router }
    }

    /// The id of the seeded "Super User" group (priority 0).
    pub async fn super_group_id(&self) -> i64 {
        self.store
            .groups()
            .await
            .expect("groups")
            .into_iter()
            .find(|g| g.name == "Super User")
            .expect("seeded Super User group")
            .id
    }

    /// Creates a group with the named permission grants.
    pub async fn seed_group(&self, name: &str, priority: i64, permissions: &[&str]) -> Group {
        let permission_ids = self.store.permission_ids_by_name(permissions);
        self.store
            .create_group(NewGroup {
                name: name.to_string(),
                priority,
                expiration: None,
                permission_ids,
            })
            .await
            .expect("create group")
    }

    /// Creates a user with the named user-level permission grants. The
    /// password is always `"pw"`.
    pub async fn seed_user(
        &self,
        username: &str,
        group_id: Option<i64>,
        permissions: &[&str],
    ) -> User {
        let permission_ids = self.store.permission_ids_by_name(permissions);
        self.store
            .create_user(NewUser {
                username: username.to_string(),
                password: "pw".to_string(),
                group_id,
                group_expiration: None,
                permission_ids,
            })
            .await
            .expect("create user")
    }

    /// Logs a user in and returns the issued bearer token.
    pub async fn login(&self, username: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({ "username": username, "password": "pw" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().expect("token in response").to_string()
    }

    /// Sends one request through the router and returns status plus parsed
    /// JSON body (`Value::Null` when the body is empty).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Convenience GET.
    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, path, token, None).await
    }

    /// Sends a GET with a verbatim `Authorization` header value, for tests
    /// of the header parsing itself.
    pub async fn get_with_raw_auth(&self, path: &str, header_value: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .header(header::AUTHORIZATION, header_value)
            .body(Body::empty())
            .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Assertions
// =============================================================================

/// Extracts the error message from an error envelope.
pub fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}
