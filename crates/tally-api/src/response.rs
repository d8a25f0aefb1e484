// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tally_core::{Denial, DenialReason};

// =============================================================================
// Health
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The opaque session token.
    pub token: String,
    /// Token type (always "Bearer").
    pub token_type: String,
    /// Absolute expiration instant of the session.
    pub expires_at: DateTime<Utc>,
}

impl AuthResponse {
    /// Creates a new auth response.
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_at,
        }
    }
}

// =============================================================================
// Partial update outcome
// =============================================================================

/// One denied field of a partial user update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeniedField {
    /// The request field that was denied.
    pub field: String,
    /// Machine-readable denial reason.
    pub reason: DenialReason,
    /// Human-readable explanation naming the missing capability.
    pub message: String,
}

impl DeniedField {
    /// Builds the denied-field entry for one policy denial.
    pub fn new(field: impl Into<String>, denial: Denial) -> Self {
        Self {
            field: field.into(),
            reason: denial.reason,
            message: denial_message(&denial),
        }
    }
}

/// Outcome of a field-by-field user update: every provided field lands in
/// exactly one of the two lists.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateOutcome {
    /// Fields that were applied.
    pub applied: Vec<String>,
    /// Fields that were denied, with the capability that was missing.
    pub denied: Vec<DeniedField>,
}

impl UpdateOutcome {
    /// Records an applied field.
    pub fn applied(&mut self, field: impl Into<String>) {
        self.applied.push(field.into());
    }

    /// Records a denied field.
    pub fn denied(&mut self, field: impl Into<String>, denial: Denial) {
        self.denied.push(DeniedField::new(field, denial));
    }
}

/// Formats the caller-facing explanation for a denial.
pub fn denial_message(denial: &Denial) -> String {
    match denial.reason {
        DenialReason::MissingCapability(cap) => {
            format!("Requires the \"{}\" permission.", cap.permission_name())
        }
        DenialReason::RequiresSuper(cap) => format!(
            "Requires the \"{}\" permission for targets that are not strictly subordinate.",
            cap.permission_name()
        ),
        DenialReason::HigherPrivilegedTarget => {
            "The target user is more privileged than the acting user.".to_string()
        }
        DenialReason::GroupOutranksActor => {
            "The requested group is more privileged than the acting user.".to_string()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{Capability, MutationKind};

    #[test]
    fn test_denial_message_names_missing_capability() {
        let denial = Denial {
            kind: MutationKind::Block,
            reason: DenialReason::RequiresSuper(Capability::SuperBlock),
        };
        let message = denial_message(&denial);
        assert!(message.contains("Super Block User"));
    }

    #[test]
    fn test_update_outcome_partitions_fields() {
        let mut outcome = UpdateOutcome::default();
        outcome.applied("blocked");
        outcome.denied(
            "group_id",
            Denial {
                kind: MutationKind::Assign,
                reason: DenialReason::GroupOutranksActor,
            },
        );
        assert_eq!(outcome.applied, vec!["blocked"]);
        assert_eq!(outcome.denied.len(), 1);
        assert_eq!(outcome.denied[0].field, "group_id");
    }
}
