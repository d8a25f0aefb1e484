// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session authentication middleware.
//!
//! Runs the session validator on every non-public request and attaches the
//! resolved [`Principal`] to the request extensions, where the
//! [`crate::extractors::Auth`] extractor picks it up. Rejections short-
//! circuit with the validator's fixed 401 messages.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use uuid::Uuid;

use tally_core::Principal;

use crate::auth::SessionValidator;
use crate::error::ApiError;
use crate::extractors::RequestId;

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for session authentication.
#[derive(Clone)]
pub struct AuthLayer {
    validator: Arc<SessionValidator>,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer with no public paths.
    pub fn new(validator: Arc<SessionValidator>) -> Self {
        Self {
            validator,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Sets the paths that skip authentication. A trailing `*` makes an
    /// entry a prefix match.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }

    /// Creates with the default public paths: health and login.
    pub fn with_default_public_paths(self) -> Self {
        self.with_public_paths(vec![
            "/health".to_string(),
            "/api/v1/auth/login".to_string(),
        ])
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            validator: self.validator.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for session authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    validator: Arc<SessionValidator>,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    /// Checks if a path is public.
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }
        for public_path in self.public_paths.iter() {
            if let Some(prefix) = public_path.strip_suffix('*') {
                if path.starts_with(prefix) {
                    return true;
                }
            }
        }
        false
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let validator = self.validator.clone();
        let is_public = self.is_public_path(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            req.extensions_mut().insert(RequestId(Uuid::now_v7()));

            if is_public {
                return inner.call(req).await;
            }

            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            match validator.authenticate(auth_header.as_deref()).await {
                Ok(principal) => {
                    req.extensions_mut().insert::<Principal>(principal);
                    inner.call(req).await
                }
                Err(err) => {
                    tracing::debug!(error = %err, "Request rejected by session validator");
                    Ok(ApiError::from(err).into_response())
                }
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store::MemoryStore;

    #[test]
    fn test_public_path_matching() {
        let store = Arc::new(MemoryStore::new());
        let validator = Arc::new(SessionValidator::new(store, 10));

        let layer = AuthLayer::new(validator)
            .with_public_paths(vec!["/health".to_string(), "/public/*".to_string()]);
        let middleware = layer.layer(tower::service_fn(|_req: Request<Body>| async {
            Ok::<_, std::convert::Infallible>(Response::new(Body::empty()))
        }));

        assert!(middleware.is_public_path("/health"));
        assert!(middleware.is_public_path("/public/anything"));
        assert!(!middleware.is_public_path("/api/v1/users"));
    }
}
