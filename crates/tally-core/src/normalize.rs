// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Outbound permission normalization.
//!
//! Collapses a set of atomic permissions into one compact clearance record
//! per capability for API responses. The deep variant walks an arbitrary
//! JSON response graph and rewrites every `permissions` array it finds.
//!
//! Both functions are pure: they never touch persistence and operate only
//! on values already resolved by the caller.

use serde_json::Value;

use crate::clearance::Clearance;
use crate::permission::{classify_name, display_name, ClearanceRecord, Permission};

/// Collapses atomic permissions into clearance records.
///
/// Global permissions map 1:1 to a `full` record keyed by their own name
/// and never merge. Category-scoped permissions group under their quoted
/// display name; within a group the stored clearance is the maximum tier
/// over all contributors and the report flag is sticky. Output is sorted by
/// name (case-sensitive ordinal, ascending).
pub fn normalize(permissions: &[Permission]) -> Vec<ClearanceRecord> {
    let mut records: Vec<ClearanceRecord> = Vec::new();

    for permission in permissions {
        if permission.is_global() {
            records.push(ClearanceRecord::new(
                permission.name.clone(),
                Clearance::Full,
                false,
            ));
            continue;
        }

        let name = display_name(&permission.name).unwrap_or_default().to_string();
        let (clearance, report) = classify_name(&permission.name);

        match records
            .iter_mut()
            .find(|record| record.name == name && record.clearance != Clearance::Full)
        {
            Some(record) => {
                if record.clearance.tier_rank() < clearance.tier_rank() {
                    record.clearance = clearance;
                }
                if report {
                    record.report = true;
                }
            }
            None => records.push(ClearanceRecord::new(name, clearance, report)),
        }
    }

    records.sort_by(|a, b| a.name.cmp(&b.name));
    records
}

/// Recursively rewrites every `permissions` field in a response graph.
///
/// Any object field literally named `permissions` whose value is an array
/// of permission-shaped objects is replaced in place by its normalized
/// form. Every other field recurses unchanged; non-object leaves are left
/// untouched.
pub fn normalize_deep(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(field) = map.get("permissions") {
                if let Some(permissions) = as_permission_array(field) {
                    let normalized = normalize(&permissions);
                    map.insert(
                        "permissions".to_string(),
                        serde_json::to_value(normalized).unwrap_or_default(),
                    );
                }
            }
            for (_, child) in map.iter_mut() {
                normalize_deep(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                normalize_deep(item);
            }
        }
        _ => {}
    }
}

/// Parses a JSON value as a sequence of atomic permissions, if it is one.
fn as_permission_array(value: &Value) -> Option<Vec<Permission>> {
    if !value.is_array() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

// =============================================================================
// Tests
// =============================================================================
