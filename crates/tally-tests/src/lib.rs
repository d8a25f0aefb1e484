// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Tally Integration Tests
//!
//! Integration tests for the Tally access-control service, exercised
//! through the full axum router with an in-memory store.
//!
//! ## Module Structure
//!
//! - [`common`]: shared test harness and fixtures
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p tally-tests
//!
//! # Run a specific suite
//! cargo test -p tally-tests --test integration_auth
//! cargo test -p tally-tests --test integration_users
//! cargo test -p tally-tests --test integration_groups
//! ```

pub mod common;
