// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tally-core
//!
//! Core domain types and permission logic for the tally asset-tracking
//! backend.
//!
//! This crate is pure: no I/O, no persistence, no HTTP. It provides:
//!
//! - **Clearance**: the ordered clearance-tier scale used by both directions
//!   of the permission transform
//! - **Permission**: the atomic permission catalog and its name conventions
//! - **Normalize/Denormalize**: the bidirectional transform between atomic
//!   permissions and compact clearance records
//! - **Principal**: the request-scoped authenticated actor view
//! - **Policy**: the priority-ordered user-edit authorization policy
//! - **Error**: authentication and permission-transform error kinds

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod clearance;
pub mod denormalize;
pub mod error;
pub mod normalize;
pub mod permission;
pub mod policy;
pub mod principal;
pub mod types;

pub use clearance::Clearance;
pub use error::{AuthError, PermissionError};
pub use permission::{ClearanceRecord, Permission};
pub use policy::{Capability, Denial, DenialReason, MutationKind};
pub use principal::{Principal, UserEditCapabilities};
pub use types::{Group, Session, User};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
