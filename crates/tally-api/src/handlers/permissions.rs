// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission catalog handlers.
//!
//! The catalog is read-only over the API and is returned as stored, never
//! in normalized clearance-record form: callers managing the catalog need
//! the raw rows with their ids.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::error::{ApiError, ApiResult};
use crate::extractors::Auth;
use crate::state::AppState;

/// GET /api/v1/permissions
///
/// Lists the full permission catalog, ordered by id.
pub async fn list_permissions(
    State(state): State<AppState>,
    Auth(_principal): Auth,
) -> ApiResult<impl IntoResponse> {
    let catalog = state.store.permissions().await?;
    Ok(Json(catalog))
}

/// GET /api/v1/permissions/{id}
///
/// Fetches a single catalog entry.
pub async fn get_permission(
    State(state): State<AppState>,
    Auth(_principal): Auth,
    Path(permission_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let permission = state
        .store
        .permission(permission_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("permission {permission_id}")))?;
    Ok(Json(permission))
}
