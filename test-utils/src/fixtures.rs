//! Test fixtures with sample data.
//!
//! This module provides sample SOAP documents and the payload types they
//! carry.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// SOAP 1.1 envelope namespace, repeated here so fixtures stay independent
/// of the codec under test.
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Namespace of the sample ping service.
pub const PING_NS: &str = "urn:example:ping";

/// Sample request payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename = "Ping")]
pub struct Ping {
    /// Text echoed back by the service
    #[serde(rename = "Message", default)]
    pub message: String,
}

impl Ping {
    /// Create a ping.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Sample response payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename = "PingResponse")]
pub struct PingResponse {
    /// Echoed text
    #[serde(rename = "Result", default)]
    pub result: String,
}

/// Wrap `body` in a SOAP envelope.
#[must_use]
pub fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><soap:Envelope xmlns:soap="{SOAP_ENV_NS}"><soap:Body>{body}</soap:Body></soap:Envelope>"#
    )
}

/// Envelope with a header block before the body.
#[must_use]
pub fn envelope_with_header(header: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><soap:Envelope xmlns:soap="{SOAP_ENV_NS}"><soap:Header>{header}</soap:Header><soap:Body>{body}</soap:Body></soap:Envelope>"#
    )
}

/// Reply carrying a [`PingResponse`]. `result` must not need escaping.
#[must_use]
pub fn ping_response(result: &str) -> String {
    envelope(&format!(
        r#"<PingResponse xmlns="{PING_NS}"><Result>{result}</Result></PingResponse>"#
    ))
}

/// Reply carrying a Fault. Arguments must not need escaping.
#[must_use]
pub fn fault(code: &str, string: &str) -> String {
    envelope(&format!(
        "<soap:Fault><faultcode>{code}</faultcode><faultstring>{string}</faultstring></soap:Fault>"
    ))
}

/// Reply whose Body holds two elements.
#[must_use]
pub fn two_element_body() -> String {
    envelope(&format!(
        r#"<PingResponse xmlns="{PING_NS}"><Result>a</Result></PingResponse><PingResponse xmlns="{PING_NS}"><Result>b</Result></PingResponse>"#
    ))
}

/// Reply whose Body is empty.
#[must_use]
pub fn empty_body() -> String {
    envelope("")
}

/// A Monday at midnight UTC.
#[must_use]
pub fn monday() -> DateTime<FixedOffset> {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
        .and_utc()
        .fixed_offset()
}

/// Sample service configuration consumed by the secret file encoder.
#[must_use]
pub fn sample_config_json() -> serde_json::Value {
    serde_json::json!({
        "serviceName": "member-lookup",
        "soapUrl": "https://soap.example.com/MemberService",
        "logLevel": "info"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Weekday};

    #[test]
    fn test_ping_response_shape() {
        let xml = ping_response("pong");
        assert!(xml.contains("<soap:Body><PingResponse"));
        assert!(xml.contains("<Result>pong</Result>"));
    }

    #[test]
    fn test_fault_shape() {
        let xml = fault("soap:Server", "boom");
        assert!(xml.contains("<soap:Fault><faultcode>soap:Server</faultcode>"));
    }

    #[test]
    fn test_empty_body() {
        assert!(empty_body().contains("<soap:Body></soap:Body>"));
    }

    #[test]
    fn test_monday() {
        assert_eq!(monday().weekday(), Weekday::Mon);
    }

    #[test]
    fn test_sample_config_json() {
        let config = sample_config_json();
        assert_eq!(config["serviceName"], "member-lookup");
    }
}
