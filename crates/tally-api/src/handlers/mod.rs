// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: liveness check
//! - [`auth`]: login, logout, current principal
//! - [`users`]: user listing and field-by-field mutation
//! - [`groups`]: group listing and mutation
//! - [`permissions`]: read-only catalog passthrough

mod auth;
mod groups;
mod health;
mod permissions;
mod users;

pub use auth::*;
pub use groups::*;
pub use health::*;
pub use permissions::*;
pub use users::*;

use tally_core::{Permission, PermissionError};

use crate::error::ApiResult;
use crate::state::AppState;

/// Loads the full permission catalog for denormalizing request bodies.
/// A store failure here means incoming clearance records cannot be
/// resolved, so the whole request fails.
pub(crate) async fn load_catalog(state: &AppState) -> ApiResult<Vec<Permission>> {
    state
        .store
        .permissions()
        .await
        .map_err(|_| PermissionError::CatalogUnavailable.into())
}
