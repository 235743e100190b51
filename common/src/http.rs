//! HTTP transport abstraction and client building.
//!
//! Components that talk HTTP depend on [`RequestClient`] rather than on a
//! concrete client, so a production [`reqwest::Client`] and the file-backed
//! [`MockFileClient`] are interchangeable.

use crate::error::{CommonError, CommonResult, TransportError};
use crate::path;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Request, Response};
use std::path::PathBuf;
use std::time::Duration;

/// Capability to execute one HTTP request.
#[async_trait]
pub trait RequestClient: Send + Sync {
    /// Send the request and return the response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response could be obtained.
    async fn execute(&self, request: Request) -> Result<Response, TransportError>;
}

#[async_trait]
impl RequestClient for Client {
    async fn execute(&self, request: Request) -> Result<Response, TransportError> {
        Ok(Self::execute(self, request).await?)
    }
}

/// Request timeout applied when `HTTP_CLIENT_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Connect timeout applied when `HTTP_CLIENT_CONNECT_TIMEOUT_SECS` is unset.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for the outbound client used to reach SOAP and REST backends.
///
/// Legacy endpoints are commonly HTTP/1.1 only and slow to answer, hence
/// the one-minute default timeout and `http1_only` defaulting to `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP and TLS connect timeout
    pub connect_timeout: Duration,
    /// Idle connections kept per backend host
    pub pool_max_idle_per_host: usize,
    /// Never negotiate HTTP/2
    pub http1_only: bool,
    /// Client-wide `User-Agent`; callers such as the SOAP client set their
    /// own per request when this is `None`
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            pool_max_idle_per_host: 4,
            http1_only: true,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    /// Load from `HTTP_CLIENT_TIMEOUT_SECS`, `HTTP_CLIENT_CONNECT_TIMEOUT_SECS`
    /// and `HTTP_CLIENT_HTTP1_ONLY`.
    ///
    /// # Errors
    ///
    /// Returns [`CommonError::InvalidInput`] when a value does not parse.
    pub fn from_env() -> CommonResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source; unset or blank values keep
    /// the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CommonError::InvalidInput`] when a value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CommonResult<Self> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let secs = |name: &str, default: Duration| -> CommonResult<Duration> {
            var(name).map_or(Ok(default), |v| {
                v.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| CommonError::invalid_input(format!("{name} must be whole seconds: {v}")))
            })
        };

        let mut config = Self {
            timeout: secs("HTTP_CLIENT_TIMEOUT_SECS", DEFAULT_TIMEOUT)?,
            connect_timeout: secs("HTTP_CLIENT_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT)?,
            ..Self::default()
        };
        if let Some(v) = var("HTTP_CLIENT_HTTP1_ONLY") {
            config.http1_only = v.parse().map_err(|_| {
                CommonError::invalid_input(format!("HTTP_CLIENT_HTTP1_ONLY must be true or false: {v}"))
            })?;
        }
        Ok(config)
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a client-wide user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Allow HTTP/2 negotiation.
    #[must_use]
    pub const fn with_http2(mut self) -> Self {
        self.http1_only = false;
        self
    }
}

/// Build a pooled rustls client from the configuration.
///
/// # Errors
///
/// Returns an error if the client cannot be built (e.g. TLS initialization fails).
///
/// # Examples
///
/// ```
/// use svc_common::{HttpConfig, build_http_client};
/// use std::time::Duration;
///
/// let config = HttpConfig::default().with_timeout(Duration::from_secs(5));
/// let client = build_http_client(&config).expect("client");
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut builder = ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .use_rustls_tls();
    if config.http1_only {
        builder = builder.http1_only();
    }
    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent);
    }
    builder.build()
}

/// Transport that ignores the request and replays a file from disk.
///
/// Every call answers `200 OK` over HTTP/1.0 with the file content as body.
#[derive(Debug, Clone)]
pub struct MockFileClient {
    root: PathBuf,
    file_path: String,
}

impl MockFileClient {
    /// Replay `file_path`, resolved against the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn new(file_path: impl Into<String>) -> std::io::Result<Self> {
        Ok(Self::with_root(std::env::current_dir()?, file_path))
    }

    /// Replay `file_path`, resolved against `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>, file_path: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            file_path: file_path.into(),
        }
    }

    /// Absolute path of the replayed file.
    #[must_use]
    pub fn resolved_path(&self) -> String {
        let root = self.root.to_string_lossy();
        path::resolve(&[root.as_ref(), self.file_path.as_str()])
    }
}

#[async_trait]
impl RequestClient for MockFileClient {
    async fn execute(&self, _request: Request) -> Result<Response, TransportError> {
        let resolved = self.resolved_path();
        tracing::trace!(path = %resolved, "Replaying mock response file");

        let body = tokio::fs::read(&resolved).await?;
        let response = http::Response::builder()
            .status(http::StatusCode::OK)
            .version(http::Version::HTTP_10)
            .body(body)
            .map_err(|e| TransportError::invalid_response(e.to_string()))?;
        Ok(Response::from(response))
    }
}
