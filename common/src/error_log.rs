//! Detailed error record for service diagnostics.
//!
//! [`ErrorLog`] carries the context an operator needs to reconstruct a
//! failure (root cause, upstream status code, source system, query) next to
//! the underlying error. It implements [`std::error::Error`], so it travels
//! through `?` like any other error, and serializes to JSON for structured
//! log sinks.
//!
//! # Examples
//!
//! ```
//! use svc_common::ErrorLog;
//!
//! let err = ErrorLog::with_status_code("MemberLookup", "member not found", "404");
//! assert_eq!(err.to_string(), "MemberLookup member not found StatusCode:404");
//! ```

use serde::{Serialize, Serializer};
use std::error::Error as StdError;
use std::fmt;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Structured error carrying diagnostic context.
#[derive(Debug, Default)]
pub struct ErrorLog {
    /// High level cause, like a context message
    pub root_cause: String,
    /// Free-form trace information
    pub trace: String,
    /// Upstream status code
    pub status_code: String,
    /// System the error originated from
    pub source: String,
    /// Functional scope of the failing operation
    pub scope: String,
    /// Query that was being executed
    pub query: String,
    /// Anything else worth reporting
    pub additional_information: String,
    /// Category of the failure
    pub exception_type: String,
    /// Wrapped error
    pub err: Option<BoxError>,
}

impl ErrorLog {
    /// Create an error log wrapping a plain message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            err: Some(BoxError::from(message.into())),
            ..Self::default()
        }
    }

    /// Create an error log with a root cause, message and status code.
    #[must_use]
    pub fn with_status_code(
        root_cause: impl Into<String>,
        message: impl Into<String>,
        status_code: impl Into<String>,
    ) -> Self {
        Self {
            root_cause: root_cause.into(),
            status_code: status_code.into(),
            err: Some(BoxError::from(message.into())),
            ..Self::default()
        }
    }

    /// Wrap an existing error.
    ///
    /// An error that already is an `ErrorLog` is returned as-is instead of
    /// being nested.
    pub fn from_error<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        match err.into().downcast::<Self>() {
            Ok(existing) => *existing,
            Err(other) => Self {
                err: Some(other),
                ..Self::default()
            },
        }
    }

    /// Wrap an error and attach a root cause.
    pub fn with_cause<E>(err: E, root_cause: impl Into<String>) -> Self
    where
        E: Into<BoxError>,
    {
        Self {
            root_cause: root_cause.into(),
            err: Some(err.into()),
            ..Self::default()
        }
    }

    /// Set the source system.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the query.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Set the additional information.
    #[must_use]
    pub fn with_additional_information(mut self, info: impl Into<String>) -> Self {
        self.additional_information = info.into();
        self
    }

    /// Set the exception type.
    #[must_use]
    pub fn with_exception_type(mut self, exception_type: impl Into<String>) -> Self {
        self.exception_type = exception_type.into();
        self
    }

    /// Render the record followed by the full chain of wrapped errors.
    #[must_use]
    pub fn detailed(&self) -> String {
        let mut out = self.render(false);
        let mut next: Option<&(dyn StdError + 'static)> = self.err.as_deref().map(|e| e as _);
        while let Some(err) = next {
            if !out.is_empty() {
                out.push_str(": ");
            }
            out.push_str(&err.to_string());
            next = err.source();
        }
        out
    }

    fn render(&self, include_err: bool) -> String {
        let mut segments: Vec<String> = Vec::new();
        if !self.root_cause.is_empty() {
            segments.push(self.root_cause.clone());
        }
        if !self.trace.is_empty() {
            segments.push(self.trace.clone());
        }
        if include_err {
            if let Some(msg) = self.err_message() {
                segments.push(msg);
            }
        }
        let labelled = [
            ("StatusCode:", &self.status_code),
            ("Source:", &self.source),
            ("Scope:", &self.scope),
            ("Query:", &self.query),
            ("AdditionalInformation:", &self.additional_information),
            ("ExceptionType:", &self.exception_type),
        ];
        for (label, value) in labelled {
            if !value.is_empty() {
                segments.push(format!("{label}{value}"));
            }
        }
        segments.join(" ")
    }

    fn err_message(&self) -> Option<String> {
        self.err
            .as_ref()
            .map(ToString::to_string)
            .filter(|msg| !msg.is_empty())
    }

    /// Trace merged with the wrapped error message, as written to JSON.
    fn combined_trace(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if !self.trace.is_empty() {
            parts.push(self.trace.clone());
        }
        if let Some(msg) = self.err_message() {
            parts.push(msg);
        }
        parts.join(" ")
    }
}

impl fmt::Display for ErrorLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}

impl StdError for ErrorLog {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.err.as_deref().map(|e| e as _)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorLogJson<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    root_cause: &'a str,
    trace: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    status_code: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    source: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    scope: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    query: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    additional_information: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    exception_type: &'a str,
}

impl Serialize for ErrorLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ErrorLogJson {
            root_cause: &self.root_cause,
            trace: self.combined_trace(),
            status_code: &self.status_code,
            source: &self.source,
            scope: &self.scope,
            query: &self.query,
            additional_information: &self.additional_information,
            exception_type: &self.exception_type,
        }
        .serialize(serializer)
    }
}
