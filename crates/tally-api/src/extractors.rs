// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use tally_core::{AuthError, Principal};

use crate::error::ApiError;

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for the authenticated principal.
///
/// Pulls the [`Principal`] the auth middleware attached to the request
/// extensions. Returns 401 if the request never went through the
/// middleware (a public route, or a route wired without the layer).
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(principal): Auth) -> impl IntoResponse {
///     format!("Hello, {}", principal.username)
/// }
/// ```
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Auth)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

// =============================================================================
// Bearer Token Extractor
// =============================================================================

/// Extractor for the raw bearer token of the current request.
///
/// Logout needs the presented token itself, not just the principal, to
/// clear the right session row.
#[derive(Debug)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingHeader)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidScheme)?;
        Ok(BearerToken(token.to_string()))
    }
}

// =============================================================================
// Request ID
// =============================================================================

/// The per-request id the auth middleware attaches to every request.
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub Uuid);

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .extensions
            .get::<RequestId>()
            .copied()
            .unwrap_or_else(|| RequestId(Uuid::now_v7()));
        Ok(id)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_bearer_token_extraction() {
        let (mut parts, _) = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer tok-123")
            .body(())
            .unwrap()
            .into_parts();

        let BearerToken(token) = BearerToken::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(token, "tok-123");
    }

    #[tokio::test]
    async fn test_bearer_token_rejects_other_schemes() {
        let (mut parts, _) = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Basic abc")
            .body(())
            .unwrap()
            .into_parts();

        let err = BearerToken::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "Unauthorized! Invalid authorization header."
        );
    }

    #[tokio::test]
    async fn test_auth_rejects_without_principal() {
        let (mut parts, _) = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts();

        assert!(Auth::from_request_parts(&mut parts, &()).await.is_err());
    }
}
