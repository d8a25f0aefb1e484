// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Group handlers.
//!
//! Group mutation is rank-guarded both ways: an actor can neither touch a
//! group that outranks them nor push a group's priority above their own.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tally_core::denormalize::denormalize_deep;
use tally_core::normalize::normalize_deep;
use tally_core::policy::can_assign_to_group;
use tally_core::{Group, Permission};

use crate::error::{ApiError, ApiResult};
use crate::extractors::Auth;
use crate::response::denial_message;
use crate::state::AppState;

use super::load_catalog;

// =============================================================================
// Views
// =============================================================================

/// A group row with its permission grants attached.
#[derive(Debug, Serialize)]
struct GroupView {
    #[serde(flatten)]
    group: Group,
    permissions: Vec<Permission>,
}

async fn group_view(state: &AppState, group: Group) -> ApiResult<Value> {
    let permissions = state.store.group_permissions(group.id).await?;
    serde_json::to_value(GroupView { group, permissions })
        .map_err(|err| ApiError::internal(err.to_string()))
}

// =============================================================================
// List / Get
// =============================================================================

/// GET /api/v1/groups
///
/// Lists groups with normalized permissions. The catalog has no
/// group-view permission; any authenticated principal may read groups.
pub async fn list_groups(
    State(state): State<AppState>,
    Auth(_principal): Auth,
) -> ApiResult<impl IntoResponse> {
    let mut views = Vec::new();
    for group in state.store.groups().await? {
        views.push(group_view(&state, group).await?);
    }

    let mut value = Value::Array(views);
    normalize_deep(&mut value);
    Ok(Json(value))
}

/// GET /api/v1/groups/{id}
///
/// Fetches one group with normalized permissions.
pub async fn get_group(
    State(state): State<AppState>,
    Auth(_principal): Auth,
    Path(group_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let group = state
        .store
        .group(group_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("group {group_id}")))?;

    let mut value = group_view(&state, group).await?;
    normalize_deep(&mut value);
    Ok(Json(value))
}

// =============================================================================
// Create
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateGroupRequest {
    name: String,
    priority: i64,
    #[serde(default)]
    expiration: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    permissions: Vec<i64>,
}

/// POST /api/v1/groups
///
/// Creates a group. Requires the "Create Group" permission, and the new
/// group's priority must not outrank the actor. A `permissions` array of
/// clearance records is denormalized against the catalog.
pub async fn create_group(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Json(mut body): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    if !principal.has_permission("Create Group") {
        return Err(ApiError::forbidden(
            "Requires the \"Create Group\" permission.",
        ));
    }

    let catalog = load_catalog(&state).await?;
    denormalize_deep(&mut body, &catalog)?;
    let request: CreateGroupRequest = serde_json::from_value(body)?;

    if request.name.is_empty() {
        return Err(ApiError::bad_request("Group name is required"));
    }

    can_assign_to_group(principal.rank, request.priority)
        .map_err(|denial| ApiError::forbidden(denial_message(&denial)))?;

    let group = state
        .store
        .create_group(tally_store::NewGroup {
            name: request.name,
            priority: request.priority,
            expiration: request.expiration,
            permission_ids: request.permissions,
        })
        .await?;

    tracing::info!(group_id = group.id, actor = principal.user_id, "Group created");

    let mut value = group_view(&state, group).await?;
    normalize_deep(&mut value);
    Ok((StatusCode::CREATED, Json(value)))
}

// =============================================================================
// Update
// =============================================================================

#[derive(Debug, Deserialize)]
struct UpdateGroupRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    priority: Option<i64>,
    #[serde(default)]
    expiration: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    permissions: Option<Vec<i64>>,
}

/// PUT /api/v1/groups/{id}
///
/// Applies a partial update. Requires the "Edit Group" permission; the
/// target group must not outrank the actor, and neither may the requested
/// new priority.
pub async fn update_group(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(group_id): Path<i64>,
    Json(mut body): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    if !principal.has_permission("Edit Group") {
        return Err(ApiError::forbidden(
            "Requires the \"Edit Group\" permission.",
        ));
    }

    let group = state
        .store
        .group(group_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("group {group_id}")))?;

    can_assign_to_group(principal.rank, group.priority)
        .map_err(|denial| ApiError::forbidden(denial_message(&denial)))?;

    let catalog = load_catalog(&state).await?;
    denormalize_deep(&mut body, &catalog)?;
    let request: UpdateGroupRequest = serde_json::from_value(body)?;

    if let Some(priority) = request.priority {
        can_assign_to_group(principal.rank, priority)
            .map_err(|denial| ApiError::forbidden(denial_message(&denial)))?;
    }

    let updated = state
        .store
        .update_group(
            group_id,
            tally_store::GroupPatch {
                name: request.name,
                priority: request.priority,
                expiration: request.expiration,
            },
        )
        .await?;

    if let Some(ids) = &request.permissions {
        state.store.set_group_permissions(group_id, ids).await?;
    }

    tracing::info!(group_id, actor = principal.user_id, "Group updated");

    let mut value = group_view(&state, updated).await?;
    normalize_deep(&mut value);
    Ok(Json(value))
}
