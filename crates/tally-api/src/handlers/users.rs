// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! User handlers.
//!
//! Updates are evaluated field by field: each provided field is checked
//! against the authorization policy independently, permitted changes are
//! applied, and denied ones are reported back with the capability that was
//! missing. A partially-denied update is still a 200.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tally_core::denormalize::denormalize_deep;
use tally_core::normalize::normalize_deep;
use tally_core::policy::{can_assign_to_group, can_edit};
use tally_core::{MutationKind, Permission, User};

use crate::error::{ApiError, ApiResult};
use crate::extractors::Auth;
use crate::response::{denial_message, UpdateOutcome};
use crate::state::AppState;

use super::load_catalog;

// =============================================================================
// Views
// =============================================================================

/// A user row with its user-level permission grants attached.
#[derive(Debug, Serialize)]
struct UserView {
    #[serde(flatten)]
    user: User,
    permissions: Vec<Permission>,
}

async fn user_view(state: &AppState, user: User) -> ApiResult<Value> {
    let permissions = state.store.user_permissions(user.id).await?;
    serde_json::to_value(UserView { user, permissions })
        .map_err(|err| ApiError::internal(err.to_string()))
}

/// Resolves the target's effective rank at `now`: its group's priority,
/// unless the user has no group, the group row is missing, or the
/// membership has expired.
async fn rank_of(state: &AppState, user: &User, now: DateTime<Utc>) -> ApiResult<Option<i64>> {
    let group = match user.group_id {
        Some(group_id) => state.store.group(group_id).await?,
        None => None,
    };
    Ok(match group {
        Some(group) if !user.membership_expired(now) => Some(group.priority),
        _ => None,
    })
}

// =============================================================================
// List / Get
// =============================================================================

/// GET /api/v1/users
///
/// Lists users with normalized permissions. Requires the "View User"
/// permission.
pub async fn list_users(
    State(state): State<AppState>,
    Auth(principal): Auth,
) -> ApiResult<impl IntoResponse> {
    if !principal.has_permission("View User") {
        return Err(ApiError::forbidden("Requires the \"View User\" permission."));
    }

    let mut views = Vec::new();
    for user in state.store.users().await? {
        views.push(user_view(&state, user).await?);
    }

    let mut value = Value::Array(views);
    normalize_deep(&mut value);
    Ok(Json(value))
}

/// GET /api/v1/users/{id}
///
/// Fetches one user with normalized permissions. Requires the "View User"
/// permission.
pub async fn get_user(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    if !principal.has_permission("View User") {
        return Err(ApiError::forbidden("Requires the \"View User\" permission."));
    }

    let user = state
        .store
        .user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user {user_id}")))?;

    let mut value = user_view(&state, user).await?;
    normalize_deep(&mut value);
    Ok(Json(value))
}

// =============================================================================
// Create
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    username: String,
    password: String,
    #[serde(default)]
    group_id: Option<i64>,
    #[serde(default)]
    group_expiration: Option<DateTime<Utc>>,
    /// Permission ids, after the clearance records in the raw body have
    /// been denormalized.
    #[serde(default)]
    permissions: Vec<i64>,
}

/// POST /api/v1/users
///
/// Creates a user. Requires the "Create User" permission; when an initial
/// group is supplied, the group's priority must not outrank the actor.
/// A `permissions` array of clearance records is denormalized against the
/// catalog.
pub async fn create_user(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Json(mut body): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    if !principal.has_permission("Create User") {
        return Err(ApiError::forbidden(
            "Requires the \"Create User\" permission.",
        ));
    }

    let catalog = load_catalog(&state).await?;
    denormalize_deep(&mut body, &catalog)?;
    let request: CreateUserRequest = serde_json::from_value(body)?;

    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let group_expiration = match request.group_id {
        Some(group_id) => {
            let group = state
                .store
                .group(group_id)
                .await?
                .ok_or_else(|| ApiError::bad_request(format!("group {group_id} not found")))?;
            can_assign_to_group(principal.rank, group.priority)
                .map_err(|denial| ApiError::forbidden(denial_message(&denial)))?;
            request.group_expiration.or(group.expiration)
        }
        None => request.group_expiration,
    };

    let user = state
        .store
        .create_user(tally_store::NewUser {
            username: request.username,
            password: request.password,
            group_id: request.group_id,
            group_expiration,
            permission_ids: request.permissions,
        })
        .await?;

    tracing::info!(user_id = user.id, actor = principal.user_id, "User created");

    let mut value = user_view(&state, user).await?;
    normalize_deep(&mut value);
    Ok((StatusCode::CREATED, Json(value)))
}

// =============================================================================
// Update
// =============================================================================

/// PUT /api/v1/users/{id}
///
/// Field-by-field mutation of `blocked`, `group_id`, `group_expiration`,
/// and `permissions`. Each provided field is evaluated independently;
/// the response partitions them into `applied` and `denied`.
pub async fn update_user(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(user_id): Path<i64>,
    Json(mut body): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let target = state
        .store
        .user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user {user_id}")))?;
    let now = Utc::now();
    let target_rank = rank_of(&state, &target, now).await?;

    let catalog = load_catalog(&state).await?;
    denormalize_deep(&mut body, &catalog)?;

    let fields = body
        .as_object()
        .cloned()
        .ok_or_else(|| ApiError::bad_request("Expected a JSON object"))?;

    let mut outcome = UpdateOutcome::default();

    if let Some(value) = fields.get("blocked") {
        let blocked = value
            .as_bool()
            .ok_or_else(|| ApiError::bad_request("blocked must be a boolean"))?;
        match can_edit(
            principal.rank,
            &principal.capabilities,
            target_rank,
            MutationKind::Block,
        ) {
            Ok(()) => {
                state.store.set_user_blocked(user_id, blocked).await?;
                outcome.applied("blocked");
            }
            Err(denial) => outcome.denied("blocked", denial),
        }
    }

    // group_expiration rides along with group_id when both are present;
    // on its own it is still an Assign-kind mutation.
    let expiration_rides_along = fields.contains_key("group_id");

    if let Some(value) = fields.get("group_id") {
        let assign = can_edit(
            principal.rank,
            &principal.capabilities,
            target_rank,
            MutationKind::Assign,
        );
        match assign {
            Err(denial) => {
                outcome.denied("group_id", denial);
                if fields.contains_key("group_expiration") {
                    outcome.denied("group_expiration", denial);
                }
            }
            Ok(()) => {
                if value.is_null() {
                    // Clearing the group clears the expiration with it, so a
                    // provided expiration still counts as applied.
                    state.store.set_user_group(user_id, None, None).await?;
                    outcome.applied("group_id");
                    if fields.contains_key("group_expiration") {
                        outcome.applied("group_expiration");
                    }
                } else {
                    let group_id = value
                        .as_i64()
                        .ok_or_else(|| ApiError::bad_request("group_id must be an integer"))?;
                    let group = state.store.group(group_id).await?.ok_or_else(|| {
                        ApiError::bad_request(format!("group {group_id} not found"))
                    })?;
                    match can_assign_to_group(principal.rank, group.priority) {
                        Ok(()) => {
                            let expiration = match fields.get("group_expiration") {
                                Some(value) => parse_optional_datetime(value, "group_expiration")?,
                                None => group.expiration,
                            };
                            state
                                .store
                                .set_user_group(user_id, Some(group_id), expiration)
                                .await?;
                            outcome.applied("group_id");
                            if fields.contains_key("group_expiration") {
                                outcome.applied("group_expiration");
                            }
                        }
                        Err(denial) => {
                            outcome.denied("group_id", denial);
                            if fields.contains_key("group_expiration") {
                                outcome.denied("group_expiration", denial);
                            }
                        }
                    }
                }
            }
        }
    }

    if let (Some(value), false) = (fields.get("group_expiration"), expiration_rides_along) {
        match can_edit(
            principal.rank,
            &principal.capabilities,
            target_rank,
            MutationKind::Assign,
        ) {
            Ok(()) => {
                let expiration = parse_optional_datetime(value, "group_expiration")?;
                state
                    .store
                    .set_user_group_expiration(user_id, expiration)
                    .await?;
                outcome.applied("group_expiration");
            }
            Err(denial) => outcome.denied("group_expiration", denial),
        }
    }

    if let Some(value) = fields.get("permissions") {
        match can_edit(
            principal.rank,
            &principal.capabilities,
            target_rank,
            MutationKind::Permit,
        ) {
            Ok(()) => {
                let ids = parse_ids(value)?;
                state.store.set_user_permissions(user_id, &ids).await?;
                outcome.applied("permissions");
            }
            Err(denial) => outcome.denied("permissions", denial),
        }
    }

    tracing::debug!(
        user_id,
        actor = principal.user_id,
        applied = outcome.applied.len(),
        denied = outcome.denied.len(),
        "User update evaluated"
    );

    Ok(Json(outcome))
}

// =============================================================================
// Delete
// =============================================================================

/// DELETE /api/v1/users/{id}
///
/// Removes a user. Unlike updates, removal is all-or-nothing: a denial is
/// a 403 naming the missing capability.
pub async fn delete_user(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let target = state
        .store
        .user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user {user_id}")))?;
    let target_rank = rank_of(&state, &target, Utc::now()).await?;

    can_edit(
        principal.rank,
        &principal.capabilities,
        target_rank,
        MutationKind::Remove,
    )
    .map_err(|denial| ApiError::forbidden(denial_message(&denial)))?;

    state.store.delete_user(user_id).await?;

    tracing::info!(user_id, actor = principal.user_id, "User removed");

    Ok(Json(serde_json::json!({ "success": true })))
}

// =============================================================================
// Field parsing
// =============================================================================

fn parse_optional_datetime(value: &Value, field: &str) -> ApiResult<Option<DateTime<Utc>>> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value.clone())
        .map(Some)
        .map_err(|_| ApiError::bad_request(format!("{field} must be an RFC 3339 datetime or null")))
}

fn parse_ids(value: &Value) -> ApiResult<Vec<i64>> {
    serde_json::from_value(value.clone())
        .map_err(|_| ApiError::bad_request("permissions must be an array of permission ids"))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_optional_datetime() {
        assert_eq!(
            parse_optional_datetime(&json!(null), "group_expiration").unwrap(),
            None
        );
        let parsed = parse_optional_datetime(&json!("2026-01-01T00:00:00Z"), "group_expiration")
            .unwrap()
            .unwrap();
        assert_eq!(parsed.timestamp(), 1_767_225_600);

        assert!(parse_optional_datetime(&json!("soon"), "group_expiration").is_err());
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_ids(&json!([3, 1, 2])).unwrap(), vec![3, 1, 2]);
        assert!(parse_ids(&json!(["a"])).is_err());
    }
}
