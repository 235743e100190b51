//! Shared proptest generators for the service libraries.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use proptest::prelude::*;

/// Generate text safe to embed in XML without escaping.
pub fn xml_text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 .,:-]{0,30}[a-zA-Z0-9]"
}

/// Generate text that needs XML escaping.
pub fn escaped_text_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}[&<>][a-z]{1,8}"
}

/// Generate SOAP fault codes.
pub fn fault_code_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("soap:Server".to_string()),
        Just("soap:Client".to_string()),
        Just("soap:VersionMismatch".to_string()),
        Just("soap:MustUnderstand".to_string()),
    ]
}

/// Generate XML element local names.
pub fn element_name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z]{2,15}"
}

/// Generate namespace prefixes other than `soap`.
pub fn prefix_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}".prop_filter("reserved prefix", |p| p != "soap" && !p.starts_with("xml"))
}

/// Generate HTTP status codes other than 200.
pub fn non_ok_status_strategy() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(201u16),
        Just(202u16),
        Just(204u16),
        Just(301u16),
        Just(400u16),
        Just(401u16),
        Just(403u16),
        Just(404u16),
        Just(500u16),
        Just(502u16),
        Just(503u16),
    ]
}

/// Generate relative path segments.
pub fn path_segment_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,10}"
}

/// Generate datetimes at midnight UTC between 1990 and 2060.
pub fn date_strategy() -> impl Strategy<Value = DateTime<FixedOffset>> {
    (0i64..25_567).prop_map(|offset| {
        let base = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default();
        (base + Duration::days(offset))
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc()
            .fixed_offset()
    })
}

/// Generate HTTP header names.
pub fn header_name_strategy() -> impl Strategy<Value = String> {
    "X-[A-Z][a-z]{2,10}"
}
