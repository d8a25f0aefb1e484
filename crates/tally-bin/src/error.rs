// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Binary-level error types.

use thiserror::Error;

/// Result alias for binary operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur during startup and serving.
#[derive(Debug, Error)]
pub enum BinError {
    /// The API server failed.
    #[error("server error: {0}")]
    Server(#[from] tally_api::ApiError),

    /// Seeding the store failed.
    #[error("store error: {0}")]
    Store(#[from] tally_store::StoreError),

    /// An I/O error during startup.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
