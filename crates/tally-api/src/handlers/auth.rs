// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use tally_core::normalize::normalize_deep;
use tally_core::AuthError;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, BearerToken};
use crate::response::AuthResponse;
use crate::state::AppState;

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// POST /api/v1/auth/login
///
/// Authenticates a user and issues an opaque session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let user = state
        .store
        .verify_credentials(&request.username, &request.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    if user.blocked {
        return Err(AuthError::Blocked.into());
    }

    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + state.config.session_ttl();
    let session = state
        .store
        .insert_session(user.id, token.clone(), expires_at)
        .await?;

    tracing::info!(user_id = user.id, session_id = session.id, "User logged in");

    Ok(Json(AuthResponse::new(token, expires_at)))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /api/v1/auth/logout
///
/// Clears the presented session token. Idempotent at the store level:
/// clearing an already-cleared session is a no-op.
pub async fn logout(
    State(state): State<AppState>,
    Auth(principal): Auth,
    BearerToken(token): BearerToken,
) -> ApiResult<impl IntoResponse> {
    if let Some(session) = state.store.find_session(&token).await? {
        state.store.clear_session_token(session.id).await?;
    }

    tracing::info!(user_id = principal.user_id, "User logged out");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Logged out successfully"
    })))
}

// =============================================================================
// Current Principal
// =============================================================================

/// GET /api/v1/auth/me
///
/// Returns the current principal with its effective permissions in
/// normalized (clearance record) form.
pub async fn current_user(Auth(principal): Auth) -> ApiResult<impl IntoResponse> {
    let mut value =
        serde_json::to_value(&principal).map_err(|err| ApiError::internal(err.to_string()))?;
    normalize_deep(&mut value);
    Ok(Json(value))
}
