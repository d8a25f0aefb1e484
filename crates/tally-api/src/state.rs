// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use tally_store::AccessStore;

use crate::auth::SessionValidator;
use crate::config::ApiConfig;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Passed to every handler via axum's state extraction.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// The persistence backend.
    pub store: Arc<dyn AccessStore>,
    /// Session validator, shared with the auth middleware.
    pub sessions: Arc<SessionValidator>,
}

impl AppState {
    /// Creates the application state from its parts.
    pub fn new(config: ApiConfig, store: Arc<dyn AccessStore>) -> Self {
        let config = Arc::new(config);
        let sessions = Arc::new(SessionValidator::new(
            store.clone(),
            config.session_lookup_attempts,
        ));
        Self {
            config,
            store,
            sessions,
        }
    }

    /// Returns the store.
    pub fn store(&self) -> &Arc<dyn AccessStore> {
        &self.store
    }

    /// Returns the session validator.
    pub fn sessions(&self) -> &Arc<SessionValidator> {
        &self.sessions
    }
}

// =============================================================================
// Tests
// =============================================================================
