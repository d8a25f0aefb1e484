// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Inbound permission denormalization.
//!
//! Expands compact clearance records received from a client back into the
//! atomic permission identifiers they imply, against a catalog the caller
//! has already loaded. Loading the catalog is deliberately left to the
//! caller: it keeps both functions pure and lets the caller load once per
//! request, never caching across requests.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::PermissionError;
use crate::permission::{ClearanceRecord, Permission};

/// Expands clearance records into the sorted set of implied permission ids.
///
/// For each record, an exact case-insensitive name match against the
/// catalog wins outright and selects that single permission (this is how
/// global grants round-trip). Otherwise the record's display name selects
/// the category-scoped candidates by case-insensitive substring, the
/// requested tier expands to every tier at or below it, and each implied
/// tier picks the candidate whose name contains that tier's keyword. A set
/// report flag additionally picks the report variant, independent of tier —
/// a `none`-tier record with `report: true` selects exactly the report
/// permission.
pub fn denormalize(records: &[ClearanceRecord], catalog: &[Permission]) -> Vec<i64> {
    let mut ids = BTreeSet::new();

    for record in records {
        if let Some(exact) = catalog
            .iter()
            .find(|perm| perm.name.eq_ignore_ascii_case(&record.name))
        {
            ids.insert(exact.id);
            continue;
        }

        let needle = record.name.to_lowercase();
        let candidates: Vec<&Permission> = catalog
            .iter()
            .filter(|perm| !perm.is_global() && perm.name.to_lowercase().contains(&needle))
            .collect();

        for tier in record.clearance.implied_tiers() {
            if let Some(perm) = candidates
                .iter()
                .find(|perm| perm.name.to_lowercase().contains(tier.as_str()))
            {
                ids.insert(perm.id);
            }
        }

        if record.report {
            if let Some(perm) = candidates
                .iter()
                .find(|perm| perm.name.to_lowercase().contains("report"))
            {
                ids.insert(perm.id);
            }
        }
    }

    ids.into_iter().collect()
}

/// Recursively rewrites every client-supplied `permissions` field in a
/// request graph into permission id arrays.
///
/// Mirrors [`crate::normalize::normalize_deep`]'s traversal. A
/// `permissions` array whose elements do not parse as clearance records
/// fails the whole request with [`PermissionError::MalformedRecord`];
/// permission data must never be partially applied.
pub fn denormalize_deep(value: &mut Value, catalog: &[Permission]) -> Result<(), PermissionError> {
    match value {
        Value::Object(map) => {
            if let Some(field) = map.get("permissions") {
                if field.is_array() {
                    let records: Vec<ClearanceRecord> = serde_json::from_value(field.clone())
                        .map_err(|err| PermissionError::MalformedRecord(err.to_string()))?;
                    let ids = denormalize(&records, catalog);
                    map.insert(
                        "permissions".to_string(),
                        serde_json::to_value(ids).unwrap_or_default(),
                    );
                }
            }
            for (_, child) in map.iter_mut() {
                denormalize_deep(child, catalog)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                denormalize_deep(item, catalog)?;
            }
        }
        _ => {}
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clearance::Clearance;
    use crate::normalize::normalize;
    use serde_json::json;

    /// View/edit/create/delete/report variants for one category, ids 1-5.
    fn catalog_for_x() -> Vec<Permission> {
        vec![
            Permission::scoped(1, "View Under Category: \"X\"", 1),
            Permission::scoped(2, "Edit Under Category: \"X\"", 1),
            Permission::scoped(3, "Create Under Category: \"X\"", 1),
            Permission::scoped(4, "Delete Under Category: \"X\"", 1),
            Permission::scoped(5, "Report Under Category: \"X\"", 1),
        ]
    }

    #[test]
    fn test_denormalize_expands_tiers_below_requested() {
        let records = vec![ClearanceRecord::new("X", Clearance::Create, true)];
        let ids = denormalize(&records, &catalog_for_x());
        // view, edit, create, report — not delete.
        assert_eq!(ids, vec![1, 2, 3, 5]);
    }

    #[test]
    fn test_denormalize_exact_match_takes_single_permission() {
        let mut catalog = catalog_for_x();
        catalog.push(Permission::global(10, "Block User"));

        let records = vec![ClearanceRecord::new("Block User", Clearance::Full, false)];
        assert_eq!(denormalize(&records, &catalog), vec![10]);

        // Exact matching is case-insensitive.
        let records = vec![ClearanceRecord::new("block user", Clearance::Full, false)];
        assert_eq!(denormalize(&records, &catalog), vec![10]);
    }

    #[test]
    fn test_denormalize_report_only_record() {
        let records = vec![ClearanceRecord::new("X", Clearance::None, true)];
        let ids = denormalize(&records, &catalog_for_x());
        assert_eq!(ids, vec![5]);
    }

    #[test]
    fn test_denormalize_none_without_report_selects_nothing() {
        let records = vec![ClearanceRecord::new("X", Clearance::None, false)];
        assert!(denormalize(&records, &catalog_for_x()).is_empty());
    }

    #[test]
    fn test_denormalize_unknown_capability_selects_nothing() {
        let records = vec![ClearanceRecord::new("Y", Clearance::Delete, true)];
        assert!(denormalize(&records, &catalog_for_x()).is_empty());
    }

    #[test]
    fn test_denormalize_output_sorted_and_deduplicated() {
        let records = vec![
            ClearanceRecord::new("X", Clearance::Edit, false),
            ClearanceRecord::new("X", Clearance::View, false),
        ];
        let ids = denormalize(&records, &catalog_for_x());
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_round_trip_recovers_maximal_consistent_set() {
        // Normalization is lossy above the selected tier: collapsing
        // {view, create} to "create" and expanding again yields the full
        // {view, edit, create} closure, not the original pair.
        let catalog = catalog_for_x();
        let partial = vec![catalog[0].clone(), catalog[2].clone()];

        let records = normalize(&partial);
        assert_eq!(records, vec![ClearanceRecord::new("X", Clearance::Create, false)]);

        let ids = denormalize(&records, &catalog);
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_denormalize_deep_rewrites_request_graph() {
        let catalog = catalog_for_x();
        let mut value = json!({
            "group": {
                "name": "Staff",
                "permissions": [
                    { "name": "X", "clearance": "edit", "report": false }
                ]
            }
        });

        denormalize_deep(&mut value, &catalog).unwrap();

        assert_eq!(value["group"]["permissions"], json!([1, 2]));
        assert_eq!(value["group"]["name"], json!("Staff"));
    }

    #[test]
    fn test_denormalize_deep_rejects_malformed_records() {
        let catalog = catalog_for_x();
        let mut value = json!({
            "permissions": [{ "name": "X", "clearance": "sideways", "report": false }]
        });

        let err = denormalize_deep(&mut value, &catalog).unwrap_err();
        assert!(matches!(err, PermissionError::MalformedRecord(_)));
    }
}
