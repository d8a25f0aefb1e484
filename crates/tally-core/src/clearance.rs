// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Clearance tiers.
//!
//! A clearance tier is one point on the fixed total order
//! `none < view < edit < create < delete`. It is the collapsed,
//! client-facing representation of potentially several atomic permissions.
//! The out-of-band `full` tier is used only for global (category-less)
//! permissions, which are binary grants and never merge with tiered ones.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A clearance tier on the ordered scale, plus the out-of-band `full` grant.
///
/// The derived `Ord` follows declaration order, which matches the tier
/// table: `None < View < Edit < Create < Delete`. `Full` sits above the
/// scale but never participates in tier comparison; it maps 1:1 to a global
/// permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clearance {
    /// No positive clearance. Also the tier contribution of report variants.
    None,
    /// May view items under the capability.
    View,
    /// May edit items under the capability.
    Edit,
    /// May create items under the capability.
    Create,
    /// May delete items under the capability.
    Delete,
    /// Full access; reserved for global permissions.
    Full,
}

impl Clearance {
    /// The tiered clearances in ascending order, excluding `None` and `Full`.
    pub const TIERS: [Clearance; 4] = [
        Clearance::View,
        Clearance::Edit,
        Clearance::Create,
        Clearance::Delete,
    ];

    /// Returns the tier name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Clearance::None => "none",
            Clearance::View => "view",
            Clearance::Edit => "edit",
            Clearance::Create => "create",
            Clearance::Delete => "delete",
            Clearance::Full => "full",
        }
    }

    /// Parses a tier from its lowercase name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Clearance::None),
            "view" => Some(Clearance::View),
            "edit" => Some(Clearance::Edit),
            "create" => Some(Clearance::Create),
            "delete" => Some(Clearance::Delete),
            "full" => Some(Clearance::Full),
            _ => None,
        }
    }

    /// Returns the numeric rank of this tier within the total order.
    ///
    /// `Full` is not part of the tier scale and ranks above everything,
    /// so a global record is never downgraded by a merge.
    pub fn tier_rank(&self) -> u8 {
        match self {
            Clearance::None => 0,
            Clearance::View => 1,
            Clearance::Edit => 2,
            Clearance::Create => 3,
            Clearance::Delete => 4,
            Clearance::Full => 5,
        }
    }

    /// Expands this tier into the inclusive list of all tiers at or below
    /// it, excluding `None`.
    ///
    /// Requesting `edit` implies `[view, edit]`. `None` and `Full` expand to
    /// nothing: `none` grants no positive tier, and `full` is satisfied by
    /// an exact-name match against a global permission before expansion is
    /// ever attempted.
    pub fn implied_tiers(&self) -> &'static [Clearance] {
        match self {
            Clearance::None | Clearance::Full => &[],
            Clearance::View => &Self::TIERS[..1],
            Clearance::Edit => &Self::TIERS[..2],
            Clearance::Create => &Self::TIERS[..3],
            Clearance::Delete => &Self::TIERS[..4],
        }
    }
}

impl fmt::Display for Clearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_total_order() {
        assert!(Clearance::None < Clearance::View);
        assert!(Clearance::View < Clearance::Edit);
        assert!(Clearance::Edit < Clearance::Create);
        assert!(Clearance::Create < Clearance::Delete);
    }

    #[test]
    fn test_tier_rank_matches_order() {
        let mut last = None;
        for tier in [
            Clearance::None,
            Clearance::View,
            Clearance::Edit,
            Clearance::Create,
            Clearance::Delete,
        ] {
            if let Some(prev) = last {
                assert!(tier.tier_rank() > Clearance::tier_rank(&prev));
            }
            last = Some(tier);
        }
    }

    #[test]
    fn test_implied_tiers() {
        assert!(Clearance::None.implied_tiers().is_empty());
        assert!(Clearance::Full.implied_tiers().is_empty());
        assert_eq!(Clearance::View.implied_tiers(), &[Clearance::View]);
        assert_eq!(
            Clearance::Edit.implied_tiers(),
            &[Clearance::View, Clearance::Edit]
        );
        assert_eq!(
            Clearance::Delete.implied_tiers(),
            &[
                Clearance::View,
                Clearance::Edit,
                Clearance::Create,
                Clearance::Delete
            ]
        );
    }

    #[test]
    fn test_parse_round_trip() {
        for tier in [
            Clearance::None,
            Clearance::View,
            Clearance::Edit,
            Clearance::Create,
            Clearance::Delete,
            Clearance::Full,
        ] {
            assert_eq!(Clearance::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(Clearance::parse("admin"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Clearance::Edit).unwrap();
        assert_eq!(json, "\"edit\"");
        let parsed: Clearance = serde_json::from_str("\"full\"").unwrap();
        assert_eq!(parsed, Clearance::Full);
    }
}
