//! Logging façade over `tracing`.
//!
//! Services configure the global subscriber once with [`init_logging`] and
//! hand [`Logger`] values (or any other [`LogSink`]) to the components that
//! need to log. Components only depend on the [`LogSink`] capability, which
//! lets tests substitute a recording sink.

use crate::error::{CommonError, CommonResult};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Well-known structured field keys, shared so fields are labelled
/// consistently across services.
pub mod fields {
    /// Request correlation identifier
    pub const REQUEST_ID: &str = "requestId";
    /// Remote peer address
    pub const REMOTE_ADDR: &str = "remoteAddr";
    /// Request URI
    pub const URI: &str = "uri";
    /// Elapsed time
    pub const ELAPSED: &str = "elapsed";
    /// Request payload
    pub const REQUEST: &str = "request";
    /// Response status code
    pub const STATUS_CODE: &str = "statusCode";
    /// Function name
    pub const FUNCTION: &str = "function";
    /// Request parameters
    pub const REQUEST_PARAMS: &str = "requestParams";
    /// Number of results
    pub const RESULTS_COUNT: &str = "resultsCount";
    /// Number of errors
    pub const ERRORS_COUNT: &str = "errorsCount";
    /// Outbound request URL
    pub const REQUEST_URL: &str = "requestURL";
    /// Service name
    pub const SERVICE_NAME: &str = "serviceName";
    /// Root cause of an error
    pub const ROOT_CAUSE: &str = "rootCause";
    /// System an error originated from
    pub const ERROR_SOURCE: &str = "errorSource";
    /// Marks test output
    pub const IS_TEST: &str = "isTest";
    /// Name of the running test
    pub const TEST_NAME: &str = "testName";

    /// Keys emitted as individual event fields.
    pub const KNOWN: &[&str] = &[
        REQUEST_ID,
        REMOTE_ADDR,
        URI,
        ELAPSED,
        REQUEST,
        STATUS_CODE,
        FUNCTION,
        REQUEST_PARAMS,
        RESULTS_COUNT,
        ERRORS_COUNT,
        REQUEST_URL,
        SERVICE_NAME,
        ROOT_CAUSE,
        ERROR_SOURCE,
        IS_TEST,
        TEST_NAME,
    ];
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Verbose diagnostic output
    Trace,
    /// Informational messages
    Info,
    /// Recoverable problems
    Warning,
    /// Failures
    Error,
}

impl Level {
    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trace" => Ok(Self::Trace),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(CommonError::logging(format!("invalid level specified: {other}"))),
        }
    }
}

/// Destination for leveled log messages.
pub trait LogSink: Send + Sync {
    /// Emit a message at the given level.
    fn log(&self, level: Level, message: &str);

    /// Whether messages at `level` would be emitted.
    ///
    /// Callers use this to skip building expensive diagnostic output.
    fn is_enabled(&self, level: Level) -> bool;
}

/// Default [`LogSink`] emitting `tracing` events with attached fields.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    fields: Vec<(String, String)>,
}

impl Logger {
    /// Create a logger without fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a structured field; later values for the same key win.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        let key = key.into();
        self.fields.retain(|(k, _)| *k != key);
        self.fields.push((key, value.to_string()));
        self
    }

    /// Attach the request correlation id.
    #[must_use]
    pub fn with_request_id(self, request_id: impl fmt::Display) -> Self {
        self.with_field(fields::REQUEST_ID, request_id)
    }

    /// Fields attached to this logger, in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Fields outside [`fields::KNOWN`], as a JSON object.
    fn extra_fields(&self) -> Option<String> {
        let extra: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .filter(|(k, _)| !fields::KNOWN.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        (!extra.is_empty()).then(|| serde_json::Value::Object(extra).to_string())
    }

    /// Log a trace message.
    pub fn trace(&self, message: &str) {
        self.log(Level::Trace, message);
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Log a warning message.
    pub fn warning(&self, message: &str) {
        self.log(Level::Warning, message);
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

// Every well-known key is its own event field; unset keys record nothing.
macro_rules! emit {
    ($level:expr, $logger:expr, $message:expr) => {
        tracing::event!(
            $level,
            requestId = $logger.field(fields::REQUEST_ID),
            remoteAddr = $logger.field(fields::REMOTE_ADDR),
            uri = $logger.field(fields::URI),
            elapsed = $logger.field(fields::ELAPSED),
            request = $logger.field(fields::REQUEST),
            statusCode = $logger.field(fields::STATUS_CODE),
            function = $logger.field(fields::FUNCTION),
            requestParams = $logger.field(fields::REQUEST_PARAMS),
            resultsCount = $logger.field(fields::RESULTS_COUNT),
            errorsCount = $logger.field(fields::ERRORS_COUNT),
            requestURL = $logger.field(fields::REQUEST_URL),
            serviceName = $logger.field(fields::SERVICE_NAME),
            rootCause = $logger.field(fields::ROOT_CAUSE),
            errorSource = $logger.field(fields::ERROR_SOURCE),
            isTest = $logger.field(fields::IS_TEST),
            testName = $logger.field(fields::TEST_NAME),
            extra = $logger.extra_fields().as_deref(),
            "{}",
            $message
        )
    };
}

impl LogSink for Logger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Trace => emit!(tracing::Level::TRACE, self, message),
            Level::Info => emit!(tracing::Level::INFO, self, message),
            Level::Warning => emit!(tracing::Level::WARN, self, message),
            Level::Error => emit!(tracing::Level::ERROR, self, message),
        }
    }

    fn is_enabled(&self, level: Level) -> bool {
        match level {
            Level::Trace => tracing::enabled!(tracing::Level::TRACE),
            Level::Info => tracing::enabled!(tracing::Level::INFO),
            Level::Warning => tracing::enabled!(tracing::Level::WARN),
            Level::Error => tracing::enabled!(tracing::Level::ERROR),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Deployment environment; `local` selects human-readable output,
    /// anything else selects JSON
    pub environment: String,
    /// Minimum level, overridden by `RUST_LOG` when set
    pub level: Level,
    /// Service name attached to startup output
    pub service_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            environment: "local".to_string(),
            level: Level::Error,
            service_name: "rust-service".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Build a configuration from an environment name and a level string.
    ///
    /// # Errors
    ///
    /// Returns an error if the level is not one of `trace`, `info`, `warn`
    /// or `error`.
    pub fn from_strings(environment: impl Into<String>, level: &str) -> CommonResult<Self> {
        Ok(Self {
            environment: environment.into(),
            level: level.parse()?,
            ..Self::default()
        })
    }

    /// Set the service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Set the level.
    #[must_use]
    pub const fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Whether JSON output is selected.
    #[must_use]
    pub fn json_output(&self) -> bool {
        self.environment != "local"
    }
}

/// Install the global tracing subscriber.
///
/// Should be called once at application startup.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> CommonResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let result = if config.json_output() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };
    result.map_err(|e| CommonError::logging(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        level = %config.level,
        "Logging configured"
    );
    Ok(())
}
