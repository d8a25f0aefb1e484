// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session-token validation.
//!
//! Validates the `Authorization` header of a request and resolves the
//! authenticated [`Principal`]. The lookup loop is self-healing: a session
//! row found stale (expired, orphaned, or owned by a blocked user) gets its
//! token cleared so it can never match again. The clear is best-effort; a
//! failure is logged and never escalated, because the caller is being
//! rejected either way.
//!
//! The loop is bounded and never sleeps. Transient store failures retry
//! within the bound; an unknown token fails immediately, since retrying a
//! lookup that succeeded changes nothing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use tally_core::{AuthError, Principal, User};
use tally_store::{AccessStore, StoreError};

/// Validates bearer tokens and resolves principals.
#[derive(Debug)]
pub struct SessionValidator {
    store: Arc<dyn AccessStore>,
    max_lookups: usize,
}

impl SessionValidator {
    /// Creates a validator. `max_lookups` bounds the lookup loop and is
    /// clamped to at least one attempt.
    pub fn new(store: Arc<dyn AccessStore>, max_lookups: usize) -> Self {
        Self {
            store,
            max_lookups: max_lookups.max(1),
        }
    }

    /// Authenticates a request from its `Authorization` header value.
    ///
    /// Header-shape failures reject up front. Unknown and expired tokens
    /// reject with the same message so the two cannot be told apart from
    /// outside; a blocked user's rejection is distinct and immediate.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Principal, AuthError> {
        let header = header.ok_or(AuthError::MissingHeader)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidScheme)?;

        for attempt in 1..=self.max_lookups {
            let session = match self.store.find_session(token).await {
                Ok(Some(session)) => session,
                // A successful lookup that found nothing will keep finding
                // nothing; no point retrying.
                Ok(None) => return Err(AuthError::ExpiredToken),
                Err(err) => {
                    warn!(attempt, error = %err, "Session lookup failed, retrying");
                    continue;
                }
            };

            let user = match self.store.user(session.user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    // Orphaned session; the owning user row is gone.
                    self.clear_best_effort(session.id).await;
                    return Err(AuthError::ExpiredToken);
                }
                Err(err) => {
                    warn!(attempt, error = %err, "User lookup failed, retrying");
                    continue;
                }
            };

            // A blocked owner outranks an expired session: the caller must
            // see the blocked rejection even when both apply.
            if user.blocked {
                self.clear_best_effort(session.id).await;
                return Err(AuthError::Blocked);
            }

            let now = Utc::now();
            if session.is_expired(now) {
                self.clear_best_effort(session.id).await;
                return Err(AuthError::ExpiredToken);
            }

            match self.resolve(&user, now).await {
                Ok(principal) => return Ok(principal),
                Err(err) => {
                    warn!(attempt, error = %err, "Principal resolution failed, retrying");
                }
            }
        }

        Err(AuthError::ExpiredToken)
    }

    /// Resolves the principal: group row, effective permission set
    /// (user-level grants unioned with group-level grants), rank, and
    /// capability flags.
    ///
    /// Group-level grants apply only while the membership is unexpired,
    /// matching the rank semantics.
    async fn resolve(&self, user: &User, now: DateTime<Utc>) -> Result<Principal, StoreError> {
        let group = match user.group_id {
            Some(group_id) => self.store.group(group_id).await?,
            None => None,
        };

        let mut permissions = self.store.user_permissions(user.id).await?;
        if let Some(group_id) = user.group_id {
            if !user.membership_expired(now) {
                for permission in self.store.group_permissions(group_id).await? {
                    if !permissions.iter().any(|p| p.id == permission.id) {
                        permissions.push(permission);
                    }
                }
            }
        }

        Ok(Principal::resolve(user, group.as_ref(), permissions, now))
    }

    async fn clear_best_effort(&self, session_id: i64) {
        if let Err(err) = self.store.clear_session_token(session_id).await {
            warn!(session_id, error = %err, "Failed to clear stale session token");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
