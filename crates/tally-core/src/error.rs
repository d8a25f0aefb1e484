// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core error kinds.
//!
//! Authentication failures are always surfaced to the caller; blocked users
//! are reported distinctly, while unknown and expired tokens are reported
//! identically so the two cannot be told apart from outside.

use thiserror::Error;

// =============================================================================
// AuthError
// =============================================================================

/// Why a request failed to authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header was supplied.
    #[error("Unauthorized! No Auth Header.")]
    MissingHeader,

    /// The header did not use the `Bearer` scheme.
    #[error("Unauthorized! Invalid authorization header.")]
    InvalidScheme,

    /// The token is unknown or its session has expired. The two cases are
    /// deliberately indistinguishable.
    #[error("Unauthorized! Expired Token; Log out and log in again.")]
    ExpiredToken,

    /// The owning user is blocked.
    #[error("Unauthorized! User is blocked.")]
    Blocked,
}

// =============================================================================
// PermissionError
// =============================================================================

/// Failures in the permission transform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// The full permission catalog could not be loaded. Permission data must
    /// never be partially applied, so this fails the whole request.
    #[error("Failed to retrieve all permissions")]
    CatalogUnavailable,

    /// A client-supplied clearance record did not have the expected shape.
    #[error("Malformed clearance record: {0}")]
    MalformedRecord(String),
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_messages_are_fixed() {
        assert_eq!(
            AuthError::MissingHeader.to_string(),
            "Unauthorized! No Auth Header."
        );
        assert_eq!(
            AuthError::InvalidScheme.to_string(),
            "Unauthorized! Invalid authorization header."
        );
        assert_eq!(
            AuthError::ExpiredToken.to_string(),
            "Unauthorized! Expired Token; Log out and log in again."
        );
        assert_eq!(
            AuthError::Blocked.to_string(),
            "Unauthorized! User is blocked."
        );
    }
}
