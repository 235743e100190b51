//! SOAP client options.

use secrecy::SecretString;
use std::collections::HashMap;

/// Credentials sent with HTTP basic authentication.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    /// Login name
    pub login: String,
    /// Password
    pub password: SecretString,
}

/// Options fixed when a [`SoapClient`](crate::SoapClient) is built.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Basic authentication credentials
    pub basic_auth: Option<BasicAuth>,
    /// Static HTTP headers, applied after the defaults so they override them
    pub http_headers: HashMap<String, String>,
}

impl ClientOptions {
    /// Send basic authentication with every call.
    #[must_use]
    pub fn with_basic_auth(mut self, login: impl Into<String>, password: SecretString) -> Self {
        self.basic_auth = Some(BasicAuth {
            login: login.into(),
            password,
        });
        self
    }

    /// Replace the static HTTP headers.
    #[must_use]
    pub fn with_http_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.http_headers = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Add one static HTTP header.
    #[must_use]
    pub fn with_http_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_headers.insert(name.into(), value.into());
        self
    }
}
