// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The authenticated principal.
//!
//! A [`Principal`] is a request-scoped view constructed fresh by session
//! validation on every request. It is never a persisted row and must never
//! be cached across requests; permissions and group ranks can change at any
//! time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::permission::Permission;
use crate::types::{Group, User};

// =============================================================================
// UserEditCapabilities
// =============================================================================

/// The user-edit capability flags, derived from named global permissions.
///
/// Each flag gates one kind of mutation on other users. The `super_`
/// variants extend the plain ones to equal-rank targets; the plain ones only
/// reach strictly lower-privileged targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEditCapabilities {
    /// Block or unblock any target (`Super Block User`).
    pub super_block: bool,
    /// Block or unblock subordinate targets (`Block User`).
    pub block: bool,
    /// Reassign any target's group or expiration (`Super Assign Group`).
    pub super_assign: bool,
    /// Reassign subordinate targets (`Assign Group`).
    pub assign: bool,
    /// Change any target's permissions (`Super Change User Permissions`).
    pub super_permit: bool,
    /// Change subordinate targets' permissions (`Change User Permissions`).
    pub permit: bool,
    /// Remove equal-rank targets (`Super Remove User`). Removal of strictly
    /// subordinate targets needs no flag, only rank dominance.
    pub super_remove: bool,
}

/// The global permission names that map onto capability flags.
///
/// Matching is exact and case-insensitive; substring matching would let
/// `Assign Group` shadow `Super Assign Group`.
const CAPABILITY_NAMES: [&str; 7] = [
    "Super Block User",
    "Block User",
    "Super Assign Group",
    "Assign Group",
    "Super Change User Permissions",
    "Change User Permissions",
    "Super Remove User",
];

impl UserEditCapabilities {
    /// Derives the flags from an effective permission set.
    pub fn from_permissions(permissions: &[Permission]) -> Self {
        let mut caps = Self::default();
        for perm in permissions {
            if !perm.is_global() {
                continue;
            }
            let idx = CAPABILITY_NAMES
                .iter()
                .position(|name| name.eq_ignore_ascii_case(&perm.name));
            match idx {
                Some(0) => caps.super_block = true,
                Some(1) => caps.block = true,
                Some(2) => caps.super_assign = true,
                Some(3) => caps.assign = true,
                Some(4) => caps.super_permit = true,
                Some(5) => caps.permit = true,
                Some(6) => caps.super_remove = true,
                _ => {}
            }
        }
        caps
    }

    /// A capability set with every flag raised.
    pub fn all() -> Self {
        Self {
            super_block: true,
            block: true,
            super_assign: true,
            assign: true,
            super_permit: true,
            permit: true,
            super_remove: true,
        }
    }
}

// =============================================================================
// Principal
// =============================================================================

/// An authenticated actor, resolved per request from its session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// The user's id.
    pub user_id: i64,
    /// The user's login name.
    pub username: String,
    /// Owning group, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    /// Group-derived privilege rank; `None` when the user has no group or
    /// the membership has expired. Lower is more privileged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    /// Effective permission set: user-level grants unioned with group-level
    /// grants.
    pub permissions: Vec<Permission>,
    /// Derived user-edit capability flags.
    pub capabilities: UserEditCapabilities,
}

impl Principal {
    /// Resolves a principal from its user row, group row, and effective
    /// permission set at instant `now`.
    ///
    /// The rank is undefined when the user has no group, the group row is
    /// missing, or the membership has expired.
    pub fn resolve(
        user: &User,
        group: Option<&Group>,
        permissions: Vec<Permission>,
        now: DateTime<Utc>,
    ) -> Self {
        let rank = match (user.group_id, group) {
            (Some(_), Some(group)) if !user.membership_expired(now) => Some(group.priority),
            _ => None,
        };
        let capabilities = UserEditCapabilities::from_permissions(&permissions);
        Self {
            user_id: user.id,
            username: user.username.clone(),
            group_id: user.group_id,
            rank,
            permissions,
            capabilities,
        }
    }

    /// Returns `true` if the principal holds a permission with the given
    /// name (case-insensitive).
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user_in_group(group_id: i64, expiration: Option<DateTime<Utc>>) -> User {
        User {
            id: 1,
            username: "kit".to_string(),
            blocked: false,
            group_id: Some(group_id),
            group_expiration: expiration,
        }
    }

    #[test]
    fn test_capabilities_from_names() {
        let perms = vec![
            Permission::global(1, "Block User"),
            Permission::global(2, "Super Assign Group"),
            Permission::global(3, "View User"),
        ];
        let caps = UserEditCapabilities::from_permissions(&perms);
        assert!(caps.block);
        assert!(!caps.super_block);
        assert!(caps.super_assign);
        assert!(!caps.assign);
        assert!(!caps.super_remove);
    }

    #[test]
    fn test_capability_match_is_exact_not_substring() {
        // "Super Assign Group" must not raise the plain assign flag.
        let perms = vec![Permission::global(1, "Super Assign Group")];
        let caps = UserEditCapabilities::from_permissions(&perms);
        assert!(caps.super_assign);
        assert!(!caps.assign);
    }

    #[test]
    fn test_scoped_permissions_never_grant_capabilities() {
        let perms = vec![Permission::scoped(1, "Block User", 9)];
        let caps = UserEditCapabilities::from_permissions(&perms);
        assert!(!caps.block);
    }

    #[test]
    fn test_resolve_rank_from_group() {
        let now = Utc::now();
        let group = Group::new(2, "Managers", 1);
        let user = user_in_group(2, Some(now + Duration::days(1)));
        let principal = Principal::resolve(&user, Some(&group), vec![], now);
        assert_eq!(principal.rank, Some(1));
    }

    #[test]
    fn test_resolve_rank_undefined_when_membership_expired() {
        let now = Utc::now();
        let group = Group::new(2, "Managers", 1);
        let user = user_in_group(2, Some(now - Duration::days(1)));
        let principal = Principal::resolve(&user, Some(&group), vec![], now);
        assert_eq!(principal.rank, None);
    }

    #[test]
    fn test_resolve_rank_undefined_without_group() {
        let now = Utc::now();
        let user = User {
            id: 1,
            username: "kit".to_string(),
            blocked: false,
            group_id: None,
            group_expiration: None,
        };
        let principal = Principal::resolve(&user, None, vec![], now);
        assert_eq!(principal.rank, None);
    }
}
