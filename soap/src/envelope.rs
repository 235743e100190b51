//! SOAP 1.1 envelope model and codec.
//!
//! Outbound envelopes carry pre-serialized [`XmlFragment`]s for header items
//! and body content, so any serde type (or hand-written XML) can be sent.
//! Inbound envelopes are scanned once: the first element inside the Body
//! decides between [`Body::Fault`] and [`Body::Content`], and a second
//! element is rejected as a non WS-I compliant message.

use crate::error::{SoapError, SoapResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Writer};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// SOAP 1.1 envelope namespace.
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
/// XML Schema namespace.
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
/// XML Schema instance namespace.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Prefix bound to [`SOAP_ENV_NS`] in encoded envelopes.
pub const SOAP_PREFIX: &str = "soap";

/// A serialized XML element, written verbatim into an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlFragment(String);

impl XmlFragment {
    /// Wrap already serialized XML. The content is not validated.
    #[must_use]
    pub fn raw(xml: impl Into<String>) -> Self {
        Self(xml.into())
    }

    /// Serialize a value with quick-xml's serde support.
    ///
    /// The root element is named after the type unless renamed with
    /// `#[serde(rename = "...")]`.
    ///
    /// # Errors
    ///
    /// Returns [`SoapError::Serialization`] if the value cannot be
    /// represented as XML.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> SoapResult<Self> {
        quick_xml::se::to_string(value)
            .map(Self)
            .map_err(|e| SoapError::serialization(e.to_string()))
    }

    /// The XML text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the XML text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for XmlFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SOAP Fault returned in place of the Body content.
///
/// The error message is the fault string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("{string}")]
pub struct Fault {
    /// `faultcode`, e.g. `soap:Server`
    #[serde(rename = "faultcode", default)]
    pub code: String,
    /// `faultstring`, the human readable message
    #[serde(rename = "faultstring", default)]
    pub string: String,
    /// `faultactor`
    #[serde(rename = "faultactor", default)]
    pub actor: String,
    /// Text content of `detail`; nested elements are skipped
    #[serde(default, deserialize_with = "detail_text")]
    pub detail: String,
}

fn detail_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    struct Detail {
        #[serde(rename = "$text", default)]
        text: String,
    }
    Detail::deserialize(deserializer).map(|detail| detail.text)
}

/// Header block: ordered opaque header items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Items in the order they are written
    pub items: Vec<XmlFragment>,
}

/// Body of an envelope: a fault, content, or nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body<C = XmlFragment> {
    /// The service reported a fault
    Fault(Fault),
    /// Regular payload
    Content(C),
    /// The Body element had no child element
    Empty,
}

/// SOAP 1.1 envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<C = XmlFragment> {
    /// Extra `xmlns:prefix="uri"` declarations on the root element
    pub namespaces: Vec<(String, String)>,
    /// Header block; omitted on the wire when it has no items
    pub header: Option<Header>,
    /// Body
    pub body: Body<C>,
}

fn default_namespaces() -> Vec<(String, String)> {
    vec![
        ("xsd".to_string(), XSD_NS.to_string()),
        ("xsi".to_string(), XSI_NS.to_string()),
    ]
}

impl Envelope {
    /// Envelope carrying `content` with the default schema namespaces.
    #[must_use]
    pub fn new(content: XmlFragment) -> Self {
        Self {
            namespaces: default_namespaces(),
            header: None,
            body: Body::Content(content),
        }
    }

    /// Serialize `payload` and wrap it in a default envelope.
    ///
    /// # Errors
    ///
    /// Returns [`SoapError::Serialization`] if the payload cannot be
    /// serialized.
    pub fn wrap<T: Serialize + ?Sized>(payload: &T) -> SoapResult<Self> {
        XmlFragment::from_serialize(payload).map(Self::new)
    }

    /// Envelope carrying a fault.
    #[must_use]
    pub fn fault(fault: Fault) -> Self {
        Self {
            namespaces: default_namespaces(),
            header: None,
            body: Body::Fault(fault),
        }
    }

    /// Replace the header block with the given items.
    #[must_use]
    pub fn with_header_items(mut self, items: Vec<XmlFragment>) -> Self {
        self.header = Some(Header { items });
        self
    }

    /// Encode as a standalone XML document.
    ///
    /// # Errors
    ///
    /// Returns [`SoapError::Xml`] if writing fails.
    pub fn encode(&self) -> SoapResult<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let envelope_tag = qualified("Envelope");
        let mut root = BytesStart::new(envelope_tag.as_str());
        root.push_attribute((format!("xmlns:{SOAP_PREFIX}").as_str(), SOAP_ENV_NS));
        for (prefix, uri) in &self.namespaces {
            root.push_attribute((format!("xmlns:{prefix}").as_str(), uri.as_str()));
        }
        write(&mut writer, Event::Start(root))?;

        if let Some(header) = self.header.as_ref().filter(|h| !h.items.is_empty()) {
            let header_tag = qualified("Header");
            write(&mut writer, Event::Start(BytesStart::new(header_tag.as_str())))?;
            for item in &header.items {
                writer.get_mut().extend_from_slice(item.as_str().as_bytes());
            }
            write(&mut writer, Event::End(BytesEnd::new(header_tag.as_str())))?;
        }

        let body_tag = qualified("Body");
        write(&mut writer, Event::Start(BytesStart::new(body_tag.as_str())))?;
        match &self.body {
            Body::Content(content) => writer.get_mut().extend_from_slice(content.as_str().as_bytes()),
            Body::Fault(fault) => write_fault(&mut writer, fault)?,
            Body::Empty => {}
        }
        write(&mut writer, Event::End(BytesEnd::new(body_tag.as_str())))?;

        write(&mut writer, Event::End(BytesEnd::new(envelope_tag.as_str())))?;
        Ok(writer.into_inner())
    }

    /// Encode as a string, for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`SoapError::Xml`] if writing fails.
    pub fn encode_to_string(&self) -> SoapResult<String> {
        String::from_utf8(self.encode()?).map_err(xml_err)
    }
}

fn qualified(local: &str) -> String {
    format!("{SOAP_PREFIX}:{local}")
}

fn xml_err(e: impl fmt::Display) -> SoapError {
    SoapError::xml(e.to_string())
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> SoapResult<()> {
    writer.write_event(event).map_err(xml_err)
}

fn write_fault(writer: &mut Writer<Vec<u8>>, fault: &Fault) -> SoapResult<()> {
    let fault_tag = qualified("Fault");
    write(writer, Event::Start(BytesStart::new(fault_tag.as_str())))?;
    for (tag, value) in [
        ("faultcode", &fault.code),
        ("faultstring", &fault.string),
        ("faultactor", &fault.actor),
        ("detail", &fault.detail),
    ] {
        if value.is_empty() {
            continue;
        }
        write(writer, Event::Start(BytesStart::new(tag)))?;
        write(writer, Event::Text(BytesText::new(value)))?;
        write(writer, Event::End(BytesEnd::new(tag)))?;
    }
    write(writer, Event::End(BytesEnd::new(fault_tag.as_str())))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Envelope,
    Header,
    Body,
    Fault,
    Other,
}

fn classify(ns: &ResolveResult<'_>, start: &BytesStart<'_>) -> Element {
    let in_soap_ns = matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SOAP_ENV_NS.as_bytes());
    if !in_soap_ns {
        return Element::Other;
    }
    match start.local_name().as_ref() {
        b"Envelope" => Element::Envelope,
        b"Header" => Element::Header,
        b"Body" => Element::Body,
        b"Fault" => Element::Fault,
        _ => Element::Other,
    }
}

/// Streaming scanner over an inbound envelope.
///
/// A single namespace-aware reader walks the whole document, so prefixes
/// declared on the Envelope resolve for elements nested in the Body.
struct Scanner<'i> {
    reader: NsReader<&'i [u8]>,
    input: &'i [u8],
}

/// Next structural event below the current element.
enum Next<'i> {
    /// Start tag of an element with content; `before` is its byte offset
    Start {
        kind: Element,
        start: BytesStart<'i>,
        before: usize,
    },
    /// Self-closing element
    Empty { kind: Element, before: usize },
    /// End tag of the current element
    End,
}

impl<'i> Scanner<'i> {
    fn new(input: &'i [u8]) -> Self {
        Self {
            reader: NsReader::from_reader(input),
            input,
        }
    }

    fn position(&self) -> SoapResult<usize> {
        usize::try_from(self.reader.buffer_position()).map_err(xml_err)
    }

    /// Next element event, skipping text, comments and the prolog.
    fn next(&mut self) -> SoapResult<Next<'i>> {
        loop {
            let before = self.position()?;
            let (ns, event) = self.reader.read_resolved_event().map_err(xml_err)?;
            match event {
                Event::Start(start) => {
                    let kind = classify(&ns, &start);
                    return Ok(Next::Start {
                        kind,
                        start,
                        before,
                    });
                }
                Event::Empty(start) => {
                    let kind = classify(&ns, &start);
                    return Ok(Next::Empty { kind, before });
                }
                Event::End(_) => return Ok(Next::End),
                Event::Eof => return Err(SoapError::xml("unexpected end of document")),
                _ => {}
            }
        }
    }

    /// Consume an element's content and return its full markup.
    fn capture(&mut self, start: &BytesStart<'i>, before: usize) -> SoapResult<&'i [u8]> {
        self.reader.read_to_end(start.name()).map_err(xml_err)?;
        self.slice(before)
    }

    fn slice(&self, from: usize) -> SoapResult<&'i [u8]> {
        let to = self.position()?;
        self.input
            .get(from..to)
            .ok_or_else(|| SoapError::xml("element span outside of input"))
    }

    /// Raw markup of every child element until the current end tag.
    fn children(&mut self) -> SoapResult<Vec<(Element, &'i [u8])>> {
        let mut children = Vec::new();
        loop {
            match self.next()? {
                Next::End => return Ok(children),
                Next::Start {
                    kind,
                    start,
                    before,
                } => children.push((kind, self.capture(&start, before)?)),
                Next::Empty { kind, before } => children.push((kind, self.slice(before)?)),
            }
        }
    }

    /// Decode the Body content; the Body start tag has been read.
    fn body<C: DeserializeOwned>(&mut self) -> SoapResult<Body<C>> {
        let mut first = None;
        loop {
            let child = match self.next()? {
                Next::End => break,
                Next::Start {
                    kind,
                    start,
                    before,
                } => (kind, self.capture(&start, before)?),
                Next::Empty { kind, before } => (kind, self.slice(before)?),
            };
            if first.is_some() {
                return Err(SoapError::MultipleBodyElements);
            }
            first = Some(child);
        }
        // Deserialize only once the Body is known to hold a single element.
        Ok(match first {
            None => Body::Empty,
            Some((Element::Fault, raw)) => Body::Fault(from_raw(raw)?),
            Some((_, raw)) => Body::Content(from_raw(raw)?),
        })
    }
}

fn from_raw<T: DeserializeOwned>(raw: &[u8]) -> SoapResult<T> {
    let text = std::str::from_utf8(raw).map_err(xml_err)?;
    quick_xml::de::from_str(text).map_err(|e| SoapError::serialization(e.to_string()))
}

fn declared_namespaces(start: &BytesStart<'_>) -> SoapResult<Vec<(String, String)>> {
    let mut namespaces = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(xml_err)?;
        let Some(prefix) = attr.key.as_ref().strip_prefix(b"xmlns:") else {
            continue;
        };
        let uri = String::from_utf8_lossy(&attr.value);
        if uri == SOAP_ENV_NS {
            continue;
        }
        namespaces.push((String::from_utf8_lossy(prefix).into_owned(), uri.into_owned()));
    }
    Ok(namespaces)
}

/// Decode an envelope, deserializing the Body content into `C`.
///
/// # Errors
///
/// - [`SoapError::MissingEnvelope`] / [`SoapError::MissingBody`] when the
///   document is not a SOAP 1.1 envelope
/// - [`SoapError::MultipleBodyElements`] when the Body has a second element
/// - [`SoapError::Xml`] / [`SoapError::Serialization`] on malformed XML or
///   content that does not fit `C`
///
/// A Fault is not an error here; it is returned as [`Body::Fault`].
pub fn decode<C: DeserializeOwned>(bytes: &[u8]) -> SoapResult<Envelope<C>> {
    let mut scanner = Scanner::new(bytes);

    let root = match scanner.next() {
        Ok(Next::Start {
            kind: Element::Envelope,
            start,
            ..
        }) => start,
        Ok(Next::Empty {
            kind: Element::Envelope,
            ..
        }) => return Err(SoapError::MissingBody),
        Ok(_) | Err(_) => return Err(SoapError::MissingEnvelope),
    };
    let namespaces = declared_namespaces(&root)?;

    let mut header = None;
    let mut body = None;
    loop {
        match scanner.next()? {
            Next::End => break,
            Next::Start {
                kind: Element::Header,
                ..
            } => {
                let items = scanner
                    .children()?
                    .into_iter()
                    .map(|(_, raw)| std::str::from_utf8(raw).map(XmlFragment::raw))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(xml_err)?;
                header = Some(Header { items });
            }
            Next::Empty {
                kind: Element::Header,
                ..
            } => header = Some(Header::default()),
            Next::Start {
                kind: Element::Body,
                ..
            } => body = Some(scanner.body()?),
            Next::Empty {
                kind: Element::Body,
                ..
            } => body = Some(Body::Empty),
            Next::Start { start, before, .. } => {
                scanner.capture(&start, before)?;
            }
            Next::Empty { .. } => {}
        }
    }

    Ok(Envelope {
        namespaces,
        header,
        body: body.ok_or(SoapError::MissingBody)?,
    })
}

/// Decode `bytes` into `destination`.
///
/// Zero-length input means "no content": it succeeds and leaves
/// `destination` untouched, as does a Body without a child element.
/// `destination` is only written when the whole envelope decoded cleanly.
///
/// # Errors
///
/// Returns [`SoapError::Fault`] when the Body holds a Fault, otherwise the
/// errors of [`decode`].
pub fn decode_into<C: DeserializeOwned>(bytes: &[u8], destination: &mut C) -> SoapResult<()> {
    if bytes.is_empty() {
        return Ok(());
    }
    match decode::<C>(bytes)?.body {
        Body::Fault(fault) => Err(SoapError::Fault(fault)),
        Body::Content(content) => {
            *destination = content;
            Ok(())
        }
        Body::Empty => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename = "m:Ping")]
    struct Ping {
        #[serde(rename = "@xmlns:m")]
        ns: String,
        #[serde(rename = "m:Message", alias = "Message")]
        message: String,
    }

    #[derive(Debug, Default, Clone, PartialEq, Deserialize)]
    struct PingResponse {
        #[serde(rename = "Result", default)]
        result: String,
    }

    fn envelope(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><soap:Envelope xmlns:soap="{SOAP_ENV_NS}"><soap:Body>{body}</soap:Body></soap:Envelope>"#
        )
    }

    #[test]
    fn test_encode_default_envelope() {
        let ping = Ping {
            ns: "urn:ping".to_string(),
            message: "hello".to_string(),
        };
        let xml = Envelope::wrap(&ping).unwrap().encode_to_string().unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(&format!(r#"xmlns:soap="{SOAP_ENV_NS}""#)));
        assert!(xml.contains(&format!(r#"xmlns:xsd="{XSD_NS}""#)));
        assert!(xml.contains(&format!(r#"xmlns:xsi="{XSI_NS}""#)));
        assert!(xml.contains(r#"<soap:Body><m:Ping xmlns:m="urn:ping"><m:Message>hello</m:Message></m:Ping></soap:Body>"#));
        assert!(!xml.contains("soap:Header"));
    }

    #[test]
    fn test_encode_header_only_with_items() {
        let content = XmlFragment::raw("<a/>");
        let empty = Envelope::new(content.clone()).with_header_items(Vec::new());
        assert!(!empty.encode_to_string().unwrap().contains("Header"));

        let with_items = Envelope::new(content)
            .with_header_items(vec![XmlFragment::raw("<h1/>"), XmlFragment::raw("<h2/>")]);
        let xml = with_items.encode_to_string().unwrap();
        assert!(xml.contains("<soap:Header><h1/><h2/></soap:Header><soap:Body><a/></soap:Body>"));
    }

    #[test]
    fn test_encode_fault_escapes_text() {
        let fault = Fault {
            code: "soap:Client".to_string(),
            string: "a < b".to_string(),
            ..Fault::default()
        };
        let xml = Envelope::fault(fault).encode_to_string().unwrap();
        assert!(xml.contains("<soap:Fault><faultcode>soap:Client</faultcode><faultstring>a &lt; b</faultstring></soap:Fault>"));
        assert!(!xml.contains("faultactor"));
    }

    #[test]
    fn test_decode_content() {
        let xml = envelope(r#"<PingResponse xmlns="urn:ping"><Result>pong</Result></PingResponse>"#);
        let decoded: Envelope<PingResponse> = decode(xml.as_bytes()).unwrap();
        assert_eq!(
            decoded.body,
            Body::Content(PingResponse {
                result: "pong".to_string()
            })
        );
        assert!(decoded.header.is_none());
    }

    #[test]
    fn test_decode_fault() {
        let xml = envelope(
            "<soap:Fault><faultcode>soap:Server</faultcode><faultstring>boom &amp; bust</faultstring>\
             <faultactor>svc</faultactor><detail>more</detail></soap:Fault>",
        );
        let decoded: Envelope<PingResponse> = decode(xml.as_bytes()).unwrap();
        let Body::Fault(fault) = decoded.body else {
            panic!("expected fault");
        };
        assert_eq!(fault.code, "soap:Server");
        assert_eq!(fault.string, "boom & bust");
        assert_eq!(fault.actor, "svc");
        assert_eq!(fault.detail, "more");
        assert_eq!(fault.to_string(), "boom & bust");
    }

    #[test]
    fn test_fault_with_other_prefix() {
        let xml = r#"<env:Envelope xmlns:env="http://schemas.xmlsoap.org/soap/envelope/"><env:Body><env:Fault><faultstring>nope</faultstring></env:Fault></env:Body></env:Envelope>"#;
        let mut dest = PingResponse::default();
        let err = decode_into(xml.as_bytes(), &mut dest).unwrap_err();
        assert!(err.is_fault());
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_fault_outside_soap_namespace_is_content() {
        let xml = envelope(r#"<Fault xmlns="urn:other"><Result>x</Result></Fault>"#);
        let mut dest = PingResponse::default();
        decode_into(xml.as_bytes(), &mut dest).unwrap();
        assert_eq!(dest.result, "x");
    }

    #[test]
    fn test_decode_rejects_second_element() {
        for body in [
            "<PingResponse><Result>a</Result></PingResponse><Other/>",
            "<Other/><PingResponse><Result>a</Result></PingResponse>",
            "<soap:Fault><faultstring>f</faultstring></soap:Fault><Other/>",
        ] {
            let xml = envelope(body);
            let mut dest = PingResponse::default();
            let err = decode_into(xml.as_bytes(), &mut dest).unwrap_err();
            assert!(matches!(err, SoapError::MultipleBodyElements), "{body}");
            assert_eq!(dest, PingResponse::default());
        }
    }

    #[test]
    fn test_second_element_rejected_before_content_is_decoded() {
        #[derive(Debug, Deserialize)]
        struct Strict {
            #[serde(rename = "Required")]
            _required: String,
        }

        for body in [
            "<Other/><Strict><Required>x</Required></Strict>",
            "<Strict><Required>x</Required></Strict><Other/>",
            "<Other/><Other/>",
        ] {
            let xml = envelope(body);
            let err = decode::<Strict>(xml.as_bytes()).unwrap_err();
            assert!(matches!(err, SoapError::MultipleBodyElements), "{body}");
        }

        let err = decode::<Strict>(envelope("<Other/>").as_bytes()).unwrap_err();
        assert!(matches!(err, SoapError::Serialization(_)));
    }

    #[test]
    fn test_empty_input_leaves_destination() {
        let mut dest = PingResponse {
            result: "keep".to_string(),
        };
        decode_into(b"", &mut dest).unwrap();
        assert_eq!(dest.result, "keep");
    }

    #[test]
    fn test_empty_body_leaves_destination() {
        let mut dest = PingResponse {
            result: "keep".to_string(),
        };
        decode_into(envelope("").as_bytes(), &mut dest).unwrap();
        assert_eq!(dest.result, "keep");

        let xml = format!(r#"<soap:Envelope xmlns:soap="{SOAP_ENV_NS}"><soap:Body/></soap:Envelope>"#);
        let decoded: Envelope<PingResponse> = decode(xml.as_bytes()).unwrap();
        assert_eq!(decoded.body, Body::Empty);
    }

    #[test]
    fn test_decode_structural_errors() {
        let err = decode::<PingResponse>(b"<NotSoap/>").unwrap_err();
        assert!(matches!(err, SoapError::MissingEnvelope));

        let xml = format!(r#"<soap:Envelope xmlns:soap="{SOAP_ENV_NS}"></soap:Envelope>"#);
        let err = decode::<PingResponse>(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, SoapError::MissingBody));

        let xml = format!(r#"<soap:Envelope xmlns:soap="{SOAP_ENV_NS}"><soap:Body><a>"#);
        assert!(decode::<PingResponse>(xml.as_bytes()).is_err());
    }

    #[test]
    fn test_decode_keeps_header_items_and_namespaces() {
        let encoded = Envelope::new(XmlFragment::raw("<PingResponse><Result>ok</Result></PingResponse>"))
            .with_header_items(vec![
                XmlFragment::raw(r#"<t:Trace xmlns:t="urn:t">1</t:Trace>"#),
                XmlFragment::raw("<Session/>"),
            ])
            .encode()
            .unwrap();

        let decoded: Envelope<PingResponse> = decode(&encoded).unwrap();
        let items = decoded.header.unwrap().items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_str(), r#"<t:Trace xmlns:t="urn:t">1</t:Trace>"#);
        assert_eq!(items[1].as_str(), "<Session/>");
        assert_eq!(decoded.namespaces, default_namespaces());
    }
}
