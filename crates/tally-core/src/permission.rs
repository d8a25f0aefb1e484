// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The atomic permission catalog and its naming conventions.
//!
//! An atomic permission is a single, database-stored, indivisible grant.
//! Global permissions (no owning category) are binary: holding one means
//! full access to whatever it names. Category-scoped permissions embed two
//! pieces of information in their human-readable name:
//!
//! - an action keyword (`view`, `edit`, `create`, `delete`) or the word
//!   `report`, matched case-insensitively
//! - the capability's display name, quoted: `View Under Category: "Laptops"`
//!
//! The keyword table is an implicit protocol between the code that seeds
//! category permissions and the normalizer/denormalizer. Both directions go
//! through [`classify_name`] and [`display_name`] so they cannot drift.

use serde::{Deserialize, Serialize};

use crate::clearance::Clearance;

// =============================================================================
// Permission
// =============================================================================

/// An atomic permission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Unique identifier.
    pub id: i64,
    /// Human-readable name; encodes the action keyword and, for
    /// category-scoped permissions, the quoted display name.
    pub name: String,
    /// Description shown in admin tooling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning category, if any. `None` means the permission is global.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

impl Permission {
    /// Creates a global permission.
    pub fn global(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            category_id: None,
        }
    }

    /// Creates a category-scoped permission.
    pub fn scoped(id: i64, name: impl Into<String>, category_id: i64) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            category_id: Some(category_id),
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns `true` if this permission has no owning category.
    pub fn is_global(&self) -> bool {
        self.category_id.is_none()
    }
}

// =============================================================================
// ClearanceRecord
// =============================================================================

/// The compact, client-facing collapse of one capability's permissions.
///
/// Exactly one record exists per distinct capability name per normalization
/// pass. `clearance` is the maximum tier among the collapsed permissions;
/// `report` is true if any of them was a report variant. A record with
/// `clearance: none, report: true` is valid: a purely reportable capability
/// with no positive tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceRecord {
    /// The capability's display name (a global permission's own name, or
    /// the quoted category name for scoped permissions).
    pub name: String,
    /// The collapsed clearance tier.
    pub clearance: Clearance,
    /// Whether any contributing permission was a report variant.
    pub report: bool,
}

impl ClearanceRecord {
    /// Creates a new record.
    pub fn new(name: impl Into<String>, clearance: Clearance, report: bool) -> Self {
        Self {
            name: name.into(),
            clearance,
            report,
        }
    }
}

// =============================================================================
// Name classification
// =============================================================================

/// The classification keywords, in match priority order.
///
/// `report` wins over everything: a report variant contributes tier `none`
/// and sets the report flag instead, because reporting is orthogonal to the
/// clearance scale. The remaining keywords map to their tier; a name that
/// matches none of them classifies as `none`.
pub const ACTION_KEYWORDS: [(&str, Clearance); 5] = [
    ("report", Clearance::None),
    ("view", Clearance::View),
    ("edit", Clearance::Edit),
    ("create", Clearance::Create),
    ("delete", Clearance::Delete),
];

/// Classifies a permission name into its tier contribution and report flag.
///
/// Matching is case-insensitive substring search in [`ACTION_KEYWORDS`]
/// priority order.
pub fn classify_name(name: &str) -> (Clearance, bool) {
    let lowered = name.to_lowercase();
    for (keyword, tier) in ACTION_KEYWORDS {
        if lowered.contains(keyword) {
            return (tier, keyword == "report");
        }
    }
    (Clearance::None, false)
}

/// Extracts the capability display name: the text between the first pair of
/// double quotes in a permission name.
///
/// Returns `None` when the name does not contain a quoted segment.
pub fn display_name(name: &str) -> Option<&str> {
    let start = name.find('"')? + 1;
    let len = name[start..].find('"')?;
    Some(&name[start..start + len])
}

// =============================================================================
// Catalog templates
// =============================================================================

/// Name/description pairs for a category's scoped permissions.
///
/// Created programmatically whenever a category is created; the names must
/// stay in lock-step with [`classify_name`] and [`display_name`].
pub fn category_permissions(category_id: i64, category_name: &str) -> Vec<Permission> {
    let verbs = [
        ("Create", "create"),
        ("Delete", "delete"),
        ("Edit", "edit"),
        ("View", "view"),
        ("Report", "report on"),
    ];
    verbs
        .iter()
        .map(|(verb, action)| Permission {
            id: 0,
            name: format!("{verb} Under Category: \"{category_name}\""),
            description: Some(format!(
                "Gives permission to {action} permitted items under the \"{category_name}\" asset category."
            )),
            category_id: Some(category_id),
        })
        .collect()
}

/// The default global permission set.
///
/// These are the seeded, binary grants. The user-edit capability flags on a
/// [`crate::Principal`] are derived from the first seven by exact
/// (case-insensitive) name match.
pub fn default_global_permissions() -> Vec<Permission> {
    let defaults: [(&str, &str); 28] = [
        (
            "Assign Group",
            "Gives permission to assign users in lower priorities to groups.",
        ),
        (
            "Super Assign Group",
            "Gives permission to assign users in equal or lower priorities to groups.",
        ),
        ("Block User", "Gives permission to block or unblock users."),
        (
            "Super Block User",
            "Gives permission to block or unblock users of any priority.",
        ),
        (
            "Change User Permissions",
            "Gives permission to change the specific permissions of users in lower-priority groups.",
        ),
        (
            "Super Change User Permissions",
            "Gives permission to change the specific permissions of users in equal- or lower-priority groups.",
        ),
        (
            "Remove User",
            "Gives permission to remove a user status from people in lower-priority groups.",
        ),
        (
            "Super Remove User",
            "Gives permission to remove a user status from people in equal- or lower-priority groups.",
        ),
        (
            "View User",
            "Gives permission to view a user's permissions and other user-specific data.",
        ),
        (
            "Create User",
            "Gives permission to create users out of people.",
        ),
        (
            "Create Asset Profile",
            "Gives permission to create asset templates (AKA \"profiles\").",
        ),
        (
            "Edit Asset Profile",
            "Gives permission to edit asset templates (AKA \"profiles\").",
        ),
        (
            "Delete Asset Profile",
            "Gives permission to delete asset templates (AKA \"profiles\").",
        ),
        ("Create Asset Type", "Gives permission to create asset types."),
        ("Edit Asset Type", "Gives permission to edit asset types."),
        ("Delete Asset Type", "Gives permission to delete asset types."),
        ("Create Category", "Gives permission to create asset categories."),
        ("Edit Category", "Gives permission to edit asset categories."),
        ("Delete Category", "Gives permission to delete asset categories."),
        (
            "Create Group",
            "Gives permission to create groups of a lower or equal priority.",
        ),
        (
            "Edit Group",
            "Gives permission to edit groups of a lower or equal priority.",
        ),
        (
            "Delete Group",
            "Gives permission to delete groups of a lower or equal priority.",
        ),
        (
            "Create Location",
            "Gives permission to create locations (such as buildings and rooms).",
        ),
        (
            "Edit Location",
            "Gives permission to edit locations (such as buildings and rooms).",
        ),
        (
            "Delete Location",
            "Gives permission to delete locations (such as buildings and rooms).",
        ),
        ("Create Vendor", "Gives permission to create vendors."),
        ("Edit Vendor", "Gives permission to edit vendors."),
        ("Delete Vendor", "Gives permission to delete vendors."),
    ];
    defaults
        .iter()
        .map(|(name, description)| Permission {
            id: 0,
            name: (*name).to_string(),
            description: Some((*description).to_string()),
            category_id: None,
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_view() {
        assert_eq!(
            classify_name("View Under Category: \"Laptops\""),
            (Clearance::View, false)
        );
    }

    #[test]
    fn test_classify_edit() {
        assert_eq!(
            classify_name("Edit Under Category: \"Laptops\""),
            (Clearance::Edit, false)
        );
    }

    #[test]
    fn test_classify_create() {
        assert_eq!(
            classify_name("Create Under Category: \"Laptops\""),
            (Clearance::Create, false)
        );
    }

    #[test]
    fn test_classify_delete() {
        assert_eq!(
            classify_name("Delete Under Category: \"Laptops\""),
            (Clearance::Delete, false)
        );
    }

    #[test]
    fn test_classify_report() {
        // Report wins even though the tier contribution is none.
        assert_eq!(
            classify_name("Report Under Category: \"Laptops\""),
            (Clearance::None, true)
        );
    }

    #[test]
    fn test_classify_report_beats_other_keywords() {
        assert_eq!(
            classify_name("View Report Under Category: \"Laptops\""),
            (Clearance::None, true)
        );
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify_name("EDIT something"), (Clearance::Edit, false));
        assert_eq!(classify_name("RePoRt thing"), (Clearance::None, true));
    }

    #[test]
    fn test_classify_no_keyword() {
        assert_eq!(classify_name("Assign Group"), (Clearance::None, false));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(
            display_name("View Under Category: \"Laptops\""),
            Some("Laptops")
        );
        assert_eq!(display_name("Assign Group"), None);
        assert_eq!(display_name("Odd \"\" empty"), Some(""));
    }

    #[test]
    fn test_display_name_first_pair_only() {
        assert_eq!(
            display_name("a \"first\" and \"second\""),
            Some("first")
        );
    }

    #[test]
    fn test_category_permissions_classify_consistently() {
        let perms = category_permissions(7, "Laptops");
        assert_eq!(perms.len(), 5);
        for perm in &perms {
            assert_eq!(perm.category_id, Some(7));
            assert_eq!(display_name(&perm.name), Some("Laptops"));
        }
        let tiers: Vec<_> = perms.iter().map(|p| classify_name(&p.name)).collect();
        assert!(tiers.contains(&(Clearance::View, false)));
        assert!(tiers.contains(&(Clearance::Edit, false)));
        assert!(tiers.contains(&(Clearance::Create, false)));
        assert!(tiers.contains(&(Clearance::Delete, false)));
        assert!(tiers.contains(&(Clearance::None, true)));
    }

    #[test]
    fn test_default_global_permissions_are_global() {
        let perms = default_global_permissions();
        assert!(perms.iter().all(|p| p.is_global()));
        assert!(perms.iter().any(|p| p.name == "Super Remove User"));
    }

    #[test]
    fn test_defaults_seed_full_crud_triads() {
        let perms = default_global_permissions();
        for entity in ["Asset Profile", "Asset Type", "Category", "Group", "Location", "Vendor"] {
            for verb in ["Create", "Edit", "Delete"] {
                let name = format!("{verb} {entity}");
                assert!(
                    perms.iter().any(|p| p.name == name),
                    "missing default permission: {name}"
                );
            }
        }
    }
}
