//! SOAP client over a pluggable transport.

use crate::config::ClientOptions;
use crate::envelope::{self, Envelope, Header, XmlFragment};
use crate::error::{SoapError, SoapResult};
use crate::security::WsSecurityHeader;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Method, Request, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use svc_common::{Level, LogSink, RequestClient};
use tracing::{debug, instrument};

/// `Content-Type` of every SOAP 1.1 request.
pub const SOAP_CONTENT_TYPE: &str = r#"text/xml; charset="utf-8""#;

/// `User-Agent` sent unless overridden by a static header.
pub const DEFAULT_USER_AGENT: &str = concat!("svc-soap/", env!("CARGO_PKG_VERSION"));

const SOAP_ACTION: HeaderName = HeaderName::from_static("soapaction");

/// Client for one SOAP endpoint.
///
/// Header items added with [`SoapClient::add_header`] are sent with every
/// subsequent call and are never cleared.
pub struct SoapClient {
    transport: Arc<dyn RequestClient>,
    url: Url,
    logger: Arc<dyn LogSink>,
    options: ClientOptions,
    headers: Vec<XmlFragment>,
}

impl SoapClient {
    /// Create a client for the endpoint at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SoapError::InvalidUrl`] if `url` cannot be parsed.
    pub fn new(
        transport: Arc<dyn RequestClient>,
        url: &str,
        logger: Arc<dyn LogSink>,
        options: ClientOptions,
    ) -> SoapResult<Self> {
        let url = Url::parse(url).map_err(|e| SoapError::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self {
            transport,
            url,
            logger,
            options,
            headers: Vec::new(),
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Header items sent with every call, in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[XmlFragment] {
        &self.headers
    }

    /// Append a header item for all subsequent calls.
    pub fn add_header(&mut self, item: XmlFragment) {
        self.headers.push(item);
    }

    /// Append a WS-Security header for all subsequent calls.
    ///
    /// # Errors
    ///
    /// Returns [`SoapError::Xml`] if the header cannot be serialized.
    pub fn add_security_header(&mut self, header: &WsSecurityHeader) -> SoapResult<()> {
        self.add_header(header.to_fragment()?);
        Ok(())
    }

    /// Wrap `request` in a default envelope, post it and decode the reply
    /// into `response`.
    ///
    /// `response` is only written when the reply carries content.
    ///
    /// # Errors
    ///
    /// See [`SoapClient::call_envelope`].
    pub async fn call<Req, Resp>(
        &self,
        action: &str,
        request: &Req,
        response: &mut Resp,
    ) -> SoapResult<()>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        self.call_envelope(action, Envelope::wrap(request)?, response)
            .await
    }

    /// Post a caller-built envelope and decode the reply into `response`.
    ///
    /// Accumulated header items, if any, replace the envelope's header.
    ///
    /// # Errors
    ///
    /// - [`SoapError::Transport`] when the round trip fails
    /// - [`SoapError::Status`] when the endpoint does not answer 200
    /// - [`SoapError::Fault`] when the endpoint answers with a SOAP Fault
    /// - decoding errors from [`envelope::decode`]
    #[instrument(skip(self, envelope, response), fields(url = %self.url))]
    pub async fn call_envelope<Resp>(
        &self,
        action: &str,
        mut envelope: Envelope,
        response: &mut Resp,
    ) -> SoapResult<()>
    where
        Resp: DeserializeOwned,
    {
        if !self.headers.is_empty() {
            envelope.header = Some(Header {
                items: self.headers.clone(),
            });
        }
        let request = self.build_request(action, envelope.encode()?)?;

        let reply = match self.transport.execute(request).await {
            Ok(reply) => reply,
            Err(e) => {
                self.log_request(&envelope);
                return Err(SoapError::transport(self.url.as_str(), e));
            }
        };

        let status = reply.status();
        if status != StatusCode::OK {
            self.log_request(&envelope);
            return Err(SoapError::status(status));
        }

        let raw = match reply.bytes().await {
            Ok(raw) => raw,
            Err(e) => {
                self.log_request(&envelope);
                return Err(SoapError::transport(self.url.as_str(), e));
            }
        };
        if raw.is_empty() {
            debug!("SOAP reply has no content");
            return Ok(());
        }

        if let Err(e) = envelope::decode_into(&raw, response) {
            self.log_response(&raw);
            return Err(e);
        }

        if self.logger.is_enabled(Level::Trace) {
            self.log_request(&envelope);
            self.log_response(&raw);
        }
        Ok(())
    }

    fn build_request(&self, action: &str, body: Vec<u8>) -> SoapResult<Request> {
        let mut request = Request::new(Method::POST, self.url.clone());
        *request.body_mut() = Some(body.into());

        let headers = request.headers_mut();
        if let Some(auth) = &self.options.basic_auth {
            let token = STANDARD.encode(format!(
                "{}:{}",
                auth.login,
                auth.password.expose_secret()
            ));
            let mut value = header_value(&format!("Basic {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(SOAP_CONTENT_TYPE));
        headers.insert(SOAP_ACTION, header_value(action)?);
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        for (name, value) in &self.options.http_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SoapError::invalid_header(format!("{name}: {e}")))?;
            headers.insert(name, header_value(value)?);
        }
        Ok(request)
    }

    fn log_request(&self, envelope: &Envelope) {
        if let Ok(xml) = envelope.encode_to_string() {
            self.logger.log(Level::Info, &format!("soapRequest: {xml}"));
        }
    }

    fn log_response(&self, raw: &[u8]) {
        self.logger.log(
            Level::Info,
            &format!("soapResponse: {}", String::from_utf8_lossy(raw)),
        );
    }
}

fn header_value(value: &str) -> SoapResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| SoapError::invalid_header(format!("{value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use svc_common::{Logger, MockFileClient, TransportError};

    fn missing_file() -> Arc<dyn RequestClient> {
        Arc::new(MockFileClient::with_root("/nonexistent", "reply.xml"))
    }

    fn client(options: ClientOptions) -> SoapClient {
        SoapClient::new(
            missing_file(),
            "http://localhost:8080/soap",
            Arc::new(Logger::new()),
            options,
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_url() {
        let result = SoapClient::new(
            missing_file(),
            "not a url",
            Arc::new(Logger::new()),
            ClientOptions::default(),
        );
        assert!(matches!(result, Err(SoapError::InvalidUrl(_))));
    }

    #[test]
    fn test_default_headers() {
        let request = client(ClientOptions::default())
            .build_request("urn:Ping", Vec::new())
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.headers()[CONTENT_TYPE], SOAP_CONTENT_TYPE);
        assert_eq!(request.headers()["SOAPAction"], "urn:Ping");
        assert_eq!(request.headers()[USER_AGENT], DEFAULT_USER_AGENT);
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_static_headers_override_defaults() {
        let options = ClientOptions::default()
            .with_http_header("User-Agent", "soap/0.1")
            .with_http_header("X-Correlation", "abc");
        let request = client(options).build_request("urn:Ping", Vec::new()).unwrap();

        assert_eq!(request.headers()[USER_AGENT], "soap/0.1");
        assert_eq!(request.headers()[CONTENT_TYPE], SOAP_CONTENT_TYPE);
        assert_eq!(request.headers()["x-correlation"], "abc");
    }

    #[test]
    fn test_basic_auth_header() {
        let options =
            ClientOptions::default().with_basic_auth("user", secrecy::SecretString::from("pass"));
        let request = client(options).build_request("a", Vec::new()).unwrap();

        let value = &request.headers()[AUTHORIZATION];
        assert_eq!(value, "Basic dXNlcjpwYXNz");
        assert!(value.is_sensitive());
    }

    #[test]
    fn test_invalid_static_header() {
        let options = ClientOptions::default().with_http_header("bad header", "x");
        let err = client(options).build_request("a", Vec::new()).unwrap_err();
        assert!(matches!(err, SoapError::InvalidHeader(_)));
    }

    #[test]
    fn test_headers_accumulate() {
        let mut client = client(ClientOptions::default());
        client.add_header(XmlFragment::raw("<a/>"));
        client.add_header(XmlFragment::raw("<b/>"));
        assert_eq!(client.headers().len(), 2);
        assert_eq!(client.headers()[1].as_str(), "<b/>");
    }

    #[tokio::test]
    async fn test_transport_error_carries_url() {
        let client = client(ClientOptions::default());
        let mut response: Option<String> = None;
        let err = client
            .call_envelope("a", Envelope::new(XmlFragment::raw("<a/>")), &mut response)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SoapError::Transport { ref url, source: TransportError::Io(_) } if url == "http://localhost:8080/soap"
        ));
        assert!(response.is_none());
    }
}
