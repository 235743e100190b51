//! WS-Security `UsernameToken` header.

use crate::envelope::{SOAP_PREFIX, XmlFragment};
use crate::error::{SoapError, SoapResult};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use secrecy::{ExposeSecret, SecretString};

/// WS-Security extension namespace.
pub const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
/// WS-Security utility namespace.
pub const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
/// Password type for clear-text passwords.
pub const PASSWORD_TEXT_TYPE: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText";

/// `wsse:Security` header carrying a single username token.
///
/// Attach it to a client with
/// [`SoapClient::add_header`](crate::SoapClient::add_header) after
/// converting it with [`WsSecurityHeader::to_fragment`].
#[derive(Debug, Clone)]
pub struct WsSecurityHeader {
    /// Whether the receiver must process the header
    pub must_understand: bool,
    /// The username token
    pub token: UsernameToken,
}

/// `wsse:UsernameToken` with a clear-text password.
#[derive(Debug, Clone)]
pub struct UsernameToken {
    /// `wsu:Id` of the token
    pub id: String,
    /// Username
    pub username: String,
    /// Password, sent as `PasswordText`
    pub password: SecretString,
}

impl WsSecurityHeader {
    /// Create a header with a generated token id.
    #[must_use]
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            must_understand: false,
            token: UsernameToken {
                id: format!("UsernameToken-{}", uuid::Uuid::new_v4()),
                username: username.into(),
                password,
            },
        }
    }

    /// Set the token id.
    #[must_use]
    pub fn with_token_id(mut self, id: impl Into<String>) -> Self {
        self.token.id = id.into();
        self
    }

    /// Set the `mustUnderstand` flag.
    #[must_use]
    pub const fn with_must_understand(mut self, must_understand: bool) -> Self {
        self.must_understand = must_understand;
        self
    }

    /// Serialize as a header item.
    ///
    /// # Errors
    ///
    /// Returns [`SoapError::Xml`] if writing fails.
    pub fn to_fragment(&self) -> SoapResult<XmlFragment> {
        let mut writer = Writer::new(Vec::new());

        let mut security = BytesStart::new("wsse:Security");
        security.push_attribute(("xmlns:wsse", WSSE_NS));
        if self.must_understand {
            let attr = format!("{SOAP_PREFIX}:mustUnderstand");
            security.push_attribute((attr.as_str(), "1"));
        }
        emit(&mut writer, Event::Start(security))?;

        let mut token = BytesStart::new("wsse:UsernameToken");
        token.push_attribute(("xmlns:wsu", WSU_NS));
        if !self.token.id.is_empty() {
            token.push_attribute(("wsu:Id", self.token.id.as_str()));
        }
        emit(&mut writer, Event::Start(token))?;

        emit(&mut writer, Event::Start(BytesStart::new("wsse:Username")))?;
        emit(&mut writer, Event::Text(BytesText::new(&self.token.username)))?;
        emit(&mut writer, Event::End(BytesEnd::new("wsse:Username")))?;

        let mut password = BytesStart::new("wsse:Password");
        password.push_attribute(("Type", PASSWORD_TEXT_TYPE));
        emit(&mut writer, Event::Start(password))?;
        emit(
            &mut writer,
            Event::Text(BytesText::new(self.token.password.expose_secret())),
        )?;
        emit(&mut writer, Event::End(BytesEnd::new("wsse:Password")))?;

        emit(&mut writer, Event::End(BytesEnd::new("wsse:UsernameToken")))?;
        emit(&mut writer, Event::End(BytesEnd::new("wsse:Security")))?;

        String::from_utf8(writer.into_inner())
            .map(XmlFragment::raw)
            .map_err(|e| SoapError::xml(e.to_string()))
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> SoapResult<()> {
    writer
        .write_event(event)
        .map_err(|e| SoapError::xml(e.to_string()))
}
