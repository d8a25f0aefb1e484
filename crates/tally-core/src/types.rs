// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Shared row types: users, groups, sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// User
// =============================================================================

/// A user row.
///
/// Group membership is optional; the membership itself can expire
/// independently of the group's own lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Whether the user is blocked from authenticating.
    #[serde(default)]
    pub blocked: bool,
    /// Owning group, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    /// When this user's group membership lapses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_expiration: Option<DateTime<Utc>>,
}

impl User {
    /// Returns `true` if the user's group membership has expired at `now`.
    ///
    /// A user with no expiration set has an unexpiring membership.
    pub fn membership_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.group_expiration, Some(exp) if exp <= now)
    }
}

// =============================================================================
// Group
// =============================================================================

/// A group row.
///
/// `priority` orders groups by privilege: a lower value is strictly more
/// privileged. The distinguished "Super User" group has priority 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier.
    pub id: i64,
    /// Group name, unique.
    pub name: String,
    /// Privilege rank; lower is more privileged.
    pub priority: i64,
    /// Default membership expiration for users assigned to this group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
}

impl Group {
    /// Creates a new group.
    pub fn new(id: i64, name: impl Into<String>, priority: i64) -> Self {
        Self {
            id,
            name: name.into(),
            priority,
            expiration: None,
        }
    }

    /// Sets the default membership expiration.
    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }
}

// =============================================================================
// Session
// =============================================================================

/// A bearer session row.
///
/// Created at login, read and conditionally invalidated by the session
/// validator. A session whose token has been cleared is permanently inert:
/// it can never again match an incoming request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier.
    pub id: i64,
    /// The bearer token; `None` once invalidated.
    pub token: Option<String>,
    /// The owning user.
    pub user_id: i64,
    /// Absolute expiration instant. A session expiring exactly now is
    /// already expired.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Returns `true` if the session has expired at `now`.
    ///
    /// The check is strict: `expires_at <= now` is expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_expiry_is_strict() {
        let now = Utc::now();
        let session = Session {
            id: 1,
            token: Some("t".to_string()),
            user_id: 1,
            expires_at: now,
        };
        // Expiring exactly at the lookup instant counts as expired.
        assert!(session.is_expired(now));
        assert!(session.is_expired(now + Duration::seconds(1)));
        assert!(!session.is_expired(now - Duration::seconds(1)));
    }

    #[test]
    fn test_membership_expiry() {
        let now = Utc::now();
        let mut user = User {
            id: 1,
            username: "kit".to_string(),
            blocked: false,
            group_id: Some(2),
            group_expiration: None,
        };
        assert!(!user.membership_expired(now));

        user.group_expiration = Some(now - Duration::days(1));
        assert!(user.membership_expired(now));

        user.group_expiration = Some(now + Duration::days(1));
        assert!(!user.membership_expired(now));
    }
}
