// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication module.
//!
//! Session-token validation and principal resolution. Tokens are opaque
//! random strings backed by session rows; there is no claims format to
//! parse and nothing to verify offline, so every request goes through the
//! store.

mod session;

pub use session::SessionValidator;
