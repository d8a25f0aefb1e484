// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Store error kinds.

use thiserror::Error;

/// Failures from the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A row the operation requires does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// The table the lookup ran against.
        entity: &'static str,
        /// The missing id.
        id: i64,
    },

    /// A uniqueness constraint was violated.
    #[error("{entity} \"{name}\" already exists")]
    Conflict {
        /// The table the insert ran against.
        entity: &'static str,
        /// The conflicting unique value.
        name: String,
    },

    /// A grant referenced a permission id the catalog does not contain.
    /// Permission grants are applied all-or-nothing, so one unknown id
    /// fails the whole write.
    #[error("unknown permission id {0}")]
    UnknownPermission(i64),

    /// The backend itself failed.
    #[error("store backend failure: {0}")]
    Backend(String),
}
