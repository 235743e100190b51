//! Kubernetes `Secret` manifest.

use crate::error::{EncoderError, EncoderResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Key of the encoded config inside `data`.
pub const CONFIG_KEY: &str = "config.json";

/// Opaque secret holding one encoded config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretFile {
    /// Secret API version
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    /// Always `Secret`
    pub kind: String,
    /// Name and namespace
    pub metadata: Metadata,
    /// Always `Opaque`
    #[serde(rename = "type")]
    pub secret_type: String,
    /// Encoded payload
    pub data: SecretData,
}

/// Secret metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Namespace
    pub namespace: String,
    /// Secret name
    pub name: String,
}

/// Secret payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretData {
    /// Base64 encoded config file
    #[serde(rename = "config.json")]
    pub config_json: String,
}

impl SecretFile {
    /// Build a manifest, reporting every empty field at once.
    ///
    /// # Errors
    ///
    /// Returns [`EncoderError::Invalid`] when the api version, name or
    /// encoding is empty.
    pub fn new(
        api_version: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
        encoding: impl Into<String>,
    ) -> EncoderResult<Self> {
        let api_version = api_version.into();
        let name = name.into();
        let encoding = encoding.into();

        let problems: Vec<String> = [
            (api_version.is_empty(), "api version must not be empty"),
            (name.is_empty(), "name must not be empty"),
            (encoding.is_empty(), "encoding must not be empty"),
        ]
        .into_iter()
        .filter(|(empty, _)| *empty)
        .map(|(_, problem)| problem.to_string())
        .collect();
        if !problems.is_empty() {
            return Err(EncoderError::Invalid(problems));
        }

        Ok(Self {
            api_version,
            kind: "Secret".to_string(),
            metadata: Metadata {
                namespace: namespace.into(),
                name,
            },
            secret_type: "Opaque".to_string(),
            data: SecretData {
                config_json: encoding,
            },
        })
    }

    /// Render as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`EncoderError::Yaml`] if serialization fails.
    pub fn to_yaml(&self) -> EncoderResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Encode bytes as padded standard base64.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
