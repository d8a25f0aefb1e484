// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::Duration;
use serde::{Deserialize, Serialize};

// =============================================================================
// ApiConfig
// =============================================================================

/// Configuration for the API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Session lifetime in seconds. A session expiring exactly at the
    /// lookup instant is already expired.
    pub session_ttl_secs: i64,
    /// Maximum iterations of the session-validation lookup loop.
    pub session_lookup_attempts: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            cors: CorsConfig::default(),
            session_ttl_secs: 8 * 60 * 60,
            session_lookup_attempts: 10,
        }
    }
}

impl ApiConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the session lifetime.
    pub fn with_session_ttl_secs(mut self, secs: i64) -> Self {
        self.session_ttl_secs = secs;
        self
    }

    /// Returns the session lifetime as a duration.
    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(self.session_ttl_secs)
    }

    /// Reads configuration overrides from the environment.
    ///
    /// Recognized variables: `TALLY_HOST`, `TALLY_PORT`,
    /// `TALLY_SESSION_TTL_SECS`. Unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(host) = std::env::var("TALLY_HOST")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.host = host;
        }
        if let Some(port) = std::env::var("TALLY_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.port = port;
        }
        if let Some(ttl) = std::env::var("TALLY_SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.session_ttl_secs = ttl;
        }
        config
    }
}

// =============================================================================
// CorsConfig
// =============================================================================

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. `*` allows any.
    pub allowed_origins: Vec<String>,
    /// Max age for preflight cache (seconds).
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age: 3600,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_ttl_secs, 8 * 60 * 60);
        assert_eq!(config.session_lookup_attempts, 10);
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig::new().with_port(9000);
        assert_eq!(config.socket_addr().port(), 9000);
    }

    #[test]
    fn test_session_ttl() {
        let config = ApiConfig::new().with_session_ttl_secs(60);
        assert_eq!(config.session_ttl(), Duration::seconds(60));
    }
}
