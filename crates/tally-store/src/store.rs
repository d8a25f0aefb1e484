// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The access-store trait.
//!
//! Everything the API layer needs from persistence goes through
//! [`AccessStore`]: session lookup and invalidation, user and group rows,
//! and the permission catalog with its per-user and per-group grant sets.
//!
//! # Design Notes
//!
//! - The trait is object-safe; handlers hold an `Arc<dyn AccessStore>`.
//! - User mutation is granular (`set_user_blocked`, `set_user_group`,
//!   `set_user_permissions`) rather than a whole-row update, because the
//!   authorization policy grants or denies each field independently.
//! - `clear_session_token` is idempotent: clearing an already-cleared or
//!   missing session is a successful no-op. The session validator calls it
//!   best-effort from inside its lookup loop.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use tally_core::{Group, Permission, Session, User};

use crate::error::StoreError;

// =============================================================================
// Write payloads
// =============================================================================

/// Payload for creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Login name, unique.
    pub username: String,
    /// Login credential.
    pub password: String,
    /// Initial group membership, if any.
    #[serde(default)]
    pub group_id: Option<i64>,
    /// When the initial membership lapses.
    #[serde(default)]
    pub group_expiration: Option<DateTime<Utc>>,
    /// Initial user-level permission grants.
    #[serde(default)]
    pub permission_ids: Vec<i64>,
}

/// Payload for creating a group.
#[derive(Debug, Clone, Deserialize)]
pub struct NewGroup {
    /// Group name, unique.
    pub name: String,
    /// Privilege rank; lower is more privileged.
    pub priority: i64,
    /// Default membership expiration for assigned users.
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
    /// Initial group-level permission grants.
    #[serde(default)]
    pub permission_ids: Vec<i64>,
}

/// Partial group update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupPatch {
    /// New group name.
    pub name: Option<String>,
    /// New privilege rank.
    pub priority: Option<i64>,
    /// New default membership expiration.
    pub expiration: Option<DateTime<Utc>>,
}

// =============================================================================
// AccessStore
// =============================================================================

/// The persistence interface for sessions, users, groups, and permissions.
#[async_trait]
pub trait AccessStore: Send + Sync + Debug {
    // -- Sessions -------------------------------------------------------------

    /// Finds the session currently holding `token`.
    ///
    /// Sessions whose token has been cleared can never match.
    async fn find_session(&self, token: &str) -> Result<Option<Session>, StoreError>;

    /// Inserts a new session row and returns it.
    async fn insert_session(
        &self,
        user_id: i64,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError>;

    /// Clears a session's token, making the row permanently inert.
    ///
    /// Idempotent: clearing an already-cleared or missing session succeeds.
    async fn clear_session_token(&self, session_id: i64) -> Result<(), StoreError>;

    // -- Users ----------------------------------------------------------------

    /// Fetches a user by id.
    async fn user(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Fetches a user by login name.
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Lists all users, ordered by id.
    async fn users(&self) -> Result<Vec<User>, StoreError>;

    /// Creates a user.
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;

    /// Sets a user's blocked flag.
    async fn set_user_blocked(&self, user_id: i64, blocked: bool) -> Result<(), StoreError>;

    /// Reassigns a user's group and membership expiration together.
    async fn set_user_group(
        &self,
        user_id: i64,
        group_id: Option<i64>,
        expiration: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    /// Changes only the membership expiration, leaving the group alone.
    async fn set_user_group_expiration(
        &self,
        user_id: i64,
        expiration: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    /// Deletes a user along with their sessions and grants.
    async fn delete_user(&self, user_id: i64) -> Result<(), StoreError>;

    // -- Groups ---------------------------------------------------------------

    /// Fetches a group by id.
    async fn group(&self, id: i64) -> Result<Option<Group>, StoreError>;

    /// Lists all groups, ordered by id.
    async fn groups(&self) -> Result<Vec<Group>, StoreError>;

    /// Creates a group.
    async fn create_group(&self, new: NewGroup) -> Result<Group, StoreError>;

    /// Applies a partial update to a group and returns the updated row.
    async fn update_group(&self, group_id: i64, patch: GroupPatch) -> Result<Group, StoreError>;

    // -- Permission catalog ---------------------------------------------------

    /// The full permission catalog, ordered by id.
    async fn permissions(&self) -> Result<Vec<Permission>, StoreError>;

    /// Fetches a single catalog entry.
    async fn permission(&self, id: i64) -> Result<Option<Permission>, StoreError>;

    /// A user's own (user-level) permission grants.
    async fn user_permissions(&self, user_id: i64) -> Result<Vec<Permission>, StoreError>;

    /// A group's permission grants.
    async fn group_permissions(&self, group_id: i64) -> Result<Vec<Permission>, StoreError>;

    /// Replaces a user's grant set. All-or-nothing: any unknown id fails
    /// the whole write.
    async fn set_user_permissions(
        &self,
        user_id: i64,
        permission_ids: &[i64],
    ) -> Result<(), StoreError>;

    /// Replaces a group's grant set. All-or-nothing, as above.
    async fn set_group_permissions(
        &self,
        group_id: i64,
        permission_ids: &[i64],
    ) -> Result<(), StoreError>;

    // -- Credentials ----------------------------------------------------------

    /// Checks a username/password pair, returning the user on a match.
    ///
    /// A wrong password and an unknown username are indistinguishable.
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError>;
}
