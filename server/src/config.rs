//! Server configuration with environment variable support.

use crate::error::{ServerError, ServerResult};
use std::env;

/// Default listen address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";
/// Default readiness path.
pub const DEFAULT_READY_PATH: &str = "/ready";
/// Default liveness path.
pub const DEFAULT_LIVE_PATH: &str = "/live";

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address, `host:port`
    pub http_addr: String,
    /// Readiness route
    pub ready_path: String,
    /// Liveness route
    pub live_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            ready_path: DEFAULT_READY_PATH.to_string(),
            live_path: DEFAULT_LIVE_PATH.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from `HTTP_ADDR`, `READY_PATH` and `LIVE_PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidConfig`] if the values fail validation.
    pub fn from_env() -> ServerResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load from an arbitrary variable source; unset or blank values fall
    /// back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidConfig`] if the values fail validation.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ServerResult<Self> {
        let var = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let config = Self {
            http_addr: var("HTTP_ADDR", DEFAULT_HTTP_ADDR),
            ready_path: var("READY_PATH", DEFAULT_READY_PATH),
            live_path: var("LIVE_PATH", DEFAULT_LIVE_PATH),
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the listen address.
    #[must_use]
    pub fn with_http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = addr.into();
        self
    }

    /// Set the readiness and liveness routes.
    #[must_use]
    pub fn with_health_paths(mut self, ready: impl Into<String>, live: impl Into<String>) -> Self {
        self.ready_path = ready.into();
        self.live_path = live.into();
        self
    }

    /// Check that the routes can be registered.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidConfig`] when a path does not start
    /// with `/` or both paths are equal.
    pub fn validate(&self) -> ServerResult<()> {
        for (name, path) in [("READY_PATH", &self.ready_path), ("LIVE_PATH", &self.live_path)] {
            if !path.starts_with('/') {
                return Err(ServerError::invalid_config(format!(
                    "{name} must start with '/': {path}"
                )));
            }
        }
        if self.ready_path == self.live_path {
            return Err(ServerError::invalid_config(
                "READY_PATH and LIVE_PATH must differ",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.http_addr, "0.0.0.0:8080");
        assert_eq!(config.ready_path, "/ready");
        assert_eq!(config.live_path, "/live");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("READY_PATH", "/healthz/ready"),
            ("LIVE_PATH", " "),
        ]))
        .unwrap();
        assert_eq!(config.http_addr, "127.0.0.1:9000");
        assert_eq!(config.ready_path, "/healthz/ready");
        assert_eq!(config.live_path, "/live");
    }

    #[test]
    fn test_rejects_relative_path() {
        let err = ServerConfig::from_lookup(lookup(&[("READY_PATH", "ready")])).unwrap_err();
        assert!(matches!(err, ServerError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_same_paths() {
        let err = ServerConfig::default()
            .with_health_paths("/health", "/health")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }
}
