// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The user-edit authorization policy.
//!
//! Given the acting principal's rank and capability flags and the target's
//! rank, decides whether one kind of mutation (block/unblock, group
//! reassignment, permission change, removal) is permitted.
//!
//! Rank convention: a defined numeric rank is strictly more privileged the
//! *lower* its value. An undefined rank (no group, or expired membership)
//! is less privileged than any defined rank for comparison purposes, but it
//! is distinct from every numeric rank and equal only to itself — plain
//! capability flags never reach an undefined-rank target; only the `super`
//! variants do.
//!
//! The policy is pure. It reports *which* capability was missing on every
//! denial and formats no messages; the caller owns wording.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::principal::UserEditCapabilities;

// =============================================================================
// MutationKind
// =============================================================================

/// The kinds of mutation the policy gates. Each gates independently: one
/// field of a request may be permitted while another is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    /// Blocking or unblocking the target.
    Block,
    /// Reassigning the target's group or membership expiration.
    Assign,
    /// Changing the target's user-level permissions.
    Permit,
    /// Removing the target's user status entirely.
    Remove,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MutationKind::Block => "block",
            MutationKind::Assign => "assign",
            MutationKind::Permit => "permit",
            MutationKind::Remove => "remove",
        };
        write!(f, "{s}")
    }
}

// =============================================================================
// Capability
// =============================================================================

/// A single user-edit capability flag, for naming what was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// `Super Block User`.
    SuperBlock,
    /// `Block User`.
    Block,
    /// `Super Assign Group`.
    SuperAssign,
    /// `Assign Group`.
    Assign,
    /// `Super Change User Permissions`.
    SuperPermit,
    /// `Change User Permissions`.
    Permit,
    /// `Super Remove User`.
    SuperRemove,
}

impl Capability {
    /// The catalog name of the global permission that grants this flag.
    pub fn permission_name(&self) -> &'static str {
        match self {
            Capability::SuperBlock => "Super Block User",
            Capability::Block => "Block User",
            Capability::SuperAssign => "Super Assign Group",
            Capability::Assign => "Assign Group",
            Capability::SuperPermit => "Super Change User Permissions",
            Capability::Permit => "Change User Permissions",
            Capability::SuperRemove => "Super Remove User",
        }
    }
}

// =============================================================================
// Denial
// =============================================================================

/// Why a mutation was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The actor lacks the capability for this mutation kind entirely.
    MissingCapability(Capability),
    /// The actor has the plain capability, but the target is not strictly
    /// subordinate; the named `super` variant would be required.
    RequiresSuper(Capability),
    /// The target is strictly more privileged than the actor, or the actor
    /// has no rank and the target does.
    HigherPrivilegedTarget,
    /// The requested group is more privileged than the actor.
    GroupOutranksActor,
}

/// A denied mutation: the kind attempted and the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denial {
    /// The mutation that was attempted.
    pub kind: MutationKind,
    /// Why it was denied.
    pub reason: DenialReason,
}

impl Denial {
    fn new(kind: MutationKind, reason: DenialReason) -> Self {
        Self { kind, reason }
    }
}

// =============================================================================
// Rank comparison
// =============================================================================

/// Returns `true` when the target is strictly subordinate to the actor:
/// both ranks defined and the target's numeric value strictly greater.
///
/// An undefined-rank target is *not* subordinate here even though it is
/// less privileged; it is unreachable by plain capability flags.
pub fn is_subordinate(acting: Option<i64>, target: Option<i64>) -> bool {
    matches!((acting, target), (Some(a), Some(t)) if t > a)
}

/// The rank relation between actor and target after the privilege guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    /// Target strictly subordinate (both ranks defined).
    Subordinate,
    /// Ranks equal (both defined and equal, or both undefined).
    Equal,
    /// Actor ranked, target unranked.
    UnrankedTarget,
}

fn relation(acting: Option<i64>, target: Option<i64>) -> Result<Relation, DenialReason> {
    match (acting, target) {
        (None, Some(_)) => Err(DenialReason::HigherPrivilegedTarget),
        (Some(a), Some(t)) if t < a => Err(DenialReason::HigherPrivilegedTarget),
        (Some(a), Some(t)) if t > a => Ok(Relation::Subordinate),
        (Some(_), Some(_)) => Ok(Relation::Equal),
        (None, None) => Ok(Relation::Equal),
        (Some(_), None) => Ok(Relation::UnrankedTarget),
    }
}

// =============================================================================
// Policy
// =============================================================================

/// Decides whether the actor may apply `kind` to the target.
///
/// - `Block`/`Assign`/`Permit`: the `super` flag reaches any target the
///   privilege guard admits (subordinate, equal rank, or unranked); the
///   plain flag reaches strictly subordinate targets only.
/// - `Remove`: strict rank dominance needs no flag at all; equal-rank and
///   unranked targets need `super_remove`. An unranked actor may only
///   remove unranked targets, and only with `super_remove`.
///
/// The privilege guard applies to every kind: a target of strictly higher
/// privilege is never editable, and an unranked actor may never touch a
/// ranked target.
pub fn can_edit(
    acting_rank: Option<i64>,
    capabilities: &UserEditCapabilities,
    target_rank: Option<i64>,
    kind: MutationKind,
) -> Result<(), Denial> {
    let relation = relation(acting_rank, target_rank).map_err(|reason| Denial::new(kind, reason))?;

    let flags = match kind {
        MutationKind::Block => Some((
            capabilities.super_block,
            capabilities.block,
            Capability::SuperBlock,
            Capability::Block,
        )),
        MutationKind::Assign => Some((
            capabilities.super_assign,
            capabilities.assign,
            Capability::SuperAssign,
            Capability::Assign,
        )),
        MutationKind::Permit => Some((
            capabilities.super_permit,
            capabilities.permit,
            Capability::SuperPermit,
            Capability::Permit,
        )),
        MutationKind::Remove => None,
    };

    match flags {
        Some((has_super, has_plain, super_cap, plain_cap)) => {
            if has_super {
                return Ok(());
            }
            match relation {
                Relation::Subordinate if has_plain => Ok(()),
                _ if has_plain => Err(Denial::new(kind, DenialReason::RequiresSuper(super_cap))),
                _ => Err(Denial::new(kind, DenialReason::MissingCapability(plain_cap))),
            }
        }
        None => match relation {
            Relation::Subordinate => Ok(()),
            Relation::Equal | Relation::UnrankedTarget if capabilities.super_remove => Ok(()),
            _ => Err(Denial::new(
                kind,
                DenialReason::MissingCapability(Capability::SuperRemove),
            )),
        },
    }
}

/// Checks that the actor may assign a user *into* the given group.
///
/// The new group's own priority must be numerically greater than or equal
/// to the actor's rank: nobody hands out membership in a group more
/// privileged than their own. An unranked actor may never pick a group.
pub fn can_assign_to_group(acting_rank: Option<i64>, group_priority: i64) -> Result<(), Denial> {
    match acting_rank {
        Some(rank) if group_priority >= rank => Ok(()),
        _ => Err(Denial::new(
            MutationKind::Assign,
            DenialReason::GroupOutranksActor,
        )),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(f: impl FnOnce(&mut UserEditCapabilities)) -> UserEditCapabilities {
        let mut c = UserEditCapabilities::default();
        f(&mut c);
        c
    }

    #[test]
    fn test_is_subordinate() {
        assert!(is_subordinate(Some(2), Some(5)));
        assert!(!is_subordinate(Some(2), Some(2)));
        assert!(!is_subordinate(Some(5), Some(2)));
        assert!(!is_subordinate(Some(2), None));
        assert!(!is_subordinate(None, Some(2)));
        assert!(!is_subordinate(None, None));
    }

    #[test]
    fn test_plain_block_reaches_only_strict_subordinates() {
        let c = caps(|c| c.block = true);

        // Rank 2 blocking rank 5: allowed.
        assert!(can_edit(Some(2), &c, Some(5), MutationKind::Block).is_ok());

        // Equal rank: denied, naming the super variant.
        let denial = can_edit(Some(2), &c, Some(2), MutationKind::Block).unwrap_err();
        assert_eq!(denial.reason, DenialReason::RequiresSuper(Capability::SuperBlock));

        // Unranked target: denied too.
        let denial = can_edit(Some(2), &c, None, MutationKind::Block).unwrap_err();
        assert_eq!(denial.reason, DenialReason::RequiresSuper(Capability::SuperBlock));
    }

    #[test]
    fn test_super_block_reaches_equal_and_unranked() {
        let c = caps(|c| c.super_block = true);
        assert!(can_edit(Some(2), &c, Some(2), MutationKind::Block).is_ok());
        assert!(can_edit(Some(2), &c, Some(5), MutationKind::Block).is_ok());
        assert!(can_edit(Some(2), &c, None, MutationKind::Block).is_ok());
    }

    #[test]
    fn test_higher_privileged_target_always_denied() {
        let c = UserEditCapabilities::all();
        for kind in [
            MutationKind::Block,
            MutationKind::Assign,
            MutationKind::Permit,
            MutationKind::Remove,
        ] {
            let denial = can_edit(Some(5), &c, Some(2), kind).unwrap_err();
            assert_eq!(denial.reason, DenialReason::HigherPrivilegedTarget);
        }
    }

    #[test]
    fn test_unranked_actor_cannot_touch_ranked_targets() {
        let c = UserEditCapabilities::all();
        let denial = can_edit(None, &c, Some(9), MutationKind::Block).unwrap_err();
        assert_eq!(denial.reason, DenialReason::HigherPrivilegedTarget);
    }

    #[test]
    fn test_no_capability_at_all() {
        let c = UserEditCapabilities::default();
        let denial = can_edit(Some(2), &c, Some(5), MutationKind::Assign).unwrap_err();
        assert_eq!(
            denial.reason,
            DenialReason::MissingCapability(Capability::Assign)
        );
        assert_eq!(denial.kind, MutationKind::Assign);
    }

    #[test]
    fn test_remove_by_rank_dominance_needs_no_flag() {
        let c = UserEditCapabilities::default();
        assert!(can_edit(Some(1), &c, Some(3), MutationKind::Remove).is_ok());
    }

    #[test]
    fn test_remove_equal_rank_needs_super_remove() {
        let without = UserEditCapabilities::default();
        let denial = can_edit(Some(1), &without, Some(1), MutationKind::Remove).unwrap_err();
        assert_eq!(
            denial.reason,
            DenialReason::MissingCapability(Capability::SuperRemove)
        );

        let with = caps(|c| c.super_remove = true);
        assert!(can_edit(Some(1), &with, Some(1), MutationKind::Remove).is_ok());
    }

    #[test]
    fn test_unranked_actor_removes_only_unranked_targets() {
        let with = caps(|c| c.super_remove = true);
        assert!(can_edit(None, &with, None, MutationKind::Remove).is_ok());

        let denial = can_edit(None, &with, Some(3), MutationKind::Remove).unwrap_err();
        assert_eq!(denial.reason, DenialReason::HigherPrivilegedTarget);

        let without = UserEditCapabilities::default();
        let denial = can_edit(None, &without, None, MutationKind::Remove).unwrap_err();
        assert_eq!(
            denial.reason,
            DenialReason::MissingCapability(Capability::SuperRemove)
        );
    }

    #[test]
    fn test_permit_mirrors_assign_gating() {
        let c = caps(|c| c.permit = true);
        assert!(can_edit(Some(1), &c, Some(4), MutationKind::Permit).is_ok());
        let denial = can_edit(Some(1), &c, Some(1), MutationKind::Permit).unwrap_err();
        assert_eq!(
            denial.reason,
            DenialReason::RequiresSuper(Capability::SuperPermit)
        );
    }

    #[test]
    fn test_group_assignment_compares_priorities() {
        // Equal or lower-privileged (numerically >=) groups are fine.
        assert!(can_assign_to_group(Some(2), 2).is_ok());
        assert!(can_assign_to_group(Some(2), 5).is_ok());

        // A more privileged group is not.
        let denial = can_assign_to_group(Some(2), 1).unwrap_err();
        assert_eq!(denial.reason, DenialReason::GroupOutranksActor);

        // An unranked actor can never pick a group.
        let denial = can_assign_to_group(None, 99).unwrap_err();
        assert_eq!(denial.reason, DenialReason::GroupOutranksActor);
    }
}
