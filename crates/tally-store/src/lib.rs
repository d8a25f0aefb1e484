// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tally-store
//!
//! The persistence seam for the tally access-control backend.
//!
//! [`AccessStore`] is the async, object-safe trait the API layer talks to;
//! it covers sessions, users, groups, and the permission catalog.
//! [`MemoryStore`] is a thread-safe in-memory implementation with default
//! catalog seeding, used by the binary and the test suites.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::{AccessStore, GroupPatch, NewGroup, NewUser};
