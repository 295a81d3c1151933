#![forbid(unsafe_code)]

//! Identity-provider certificate configuration.
//!
//! Trust strategies read key material through [`CertificateProvider`];
//! [`IdentityProvider`] is the implementation loaded from TOML:
//!
//! ```toml
//! entity_id = "https://idp.example.org"
//! certificate_fingerprints = ["7C:1A:6A:DE:3F:38:E0:11:0C:53:B1:E1:8A:D5:AE:AE:BE:ED:F9:67"]
//!
//! [[keys]]
//! type = "X509Certificate"
//! signing = true
//! x509_certificate = "MIIDFzCCAf+gAwIBAgIU..."
//! ```

use samlsig_core::Error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The only key type the loader understands.
pub const X509_CERTIFICATE_KEY_TYPE: &str = "X509Certificate";

/// Where a trust strategy finds the keys it may trust.
pub trait CertificateProvider {
    /// Explicitly listed keys.  `Some` (even if empty) takes precedence over
    /// every other source.
    fn keys(&self) -> Option<&[KeyConfig]>;

    /// A single base64 (or PEM) certificate.
    fn certificate_data(&self) -> Option<&str>;

    /// A file holding a PEM certificate.
    fn certificate_file(&self) -> Option<&Path>;

    /// SHA-1 certificate fingerprints, any case, colons optional.
    fn certificate_fingerprints(&self) -> Option<&[String]>;
}

/// One configured key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConfig {
    #[serde(rename = "type", default = "default_key_type")]
    pub key_type: String,

    #[serde(default)]
    pub signing: bool,

    #[serde(default)]
    pub encryption: bool,

    /// Base64 certificate body.
    pub x509_certificate: String,
}

fn default_key_type() -> String {
    X509_CERTIFICATE_KEY_TYPE.to_owned()
}

impl KeyConfig {
    /// A signing certificate.
    pub fn signing(x509_certificate: impl Into<String>) -> Self {
        Self {
            key_type: default_key_type(),
            signing: true,
            encryption: false,
            x509_certificate: x509_certificate.into(),
        }
    }

    /// An encryption certificate.
    pub fn encryption(x509_certificate: impl Into<String>) -> Self {
        Self {
            key_type: default_key_type(),
            signing: false,
            encryption: true,
            x509_certificate: x509_certificate.into(),
        }
    }
}

/// Certificate configuration for one identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProvider {
    pub entity_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<KeyConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_data: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_fingerprints: Option<Vec<String>>,
}

impl IdentityProvider {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            ..Self::default()
        }
    }

    pub fn with_keys(mut self, keys: Vec<KeyConfig>) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_certificate_data(mut self, data: impl Into<String>) -> Self {
        self.certificate_data = Some(data.into());
        self
    }

    pub fn with_certificate_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.certificate_file = Some(path.into());
        self
    }

    pub fn with_certificate_fingerprints(mut self, fingerprints: Vec<String>) -> Self {
        self.certificate_fingerprints = Some(fingerprints);
        self
    }

    /// Load configuration from a TOML file.
    ///
    /// A relative `certificate_file` is resolved against the directory of
    /// the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        if let (Some(file), Some(dir)) = (config.certificate_file.as_mut(), path.parent()) {
            if file.is_relative() {
                *file = dir.join(&*file);
            }
        }
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or `entity_id` is empty.
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        if config.entity_id.trim().is_empty() {
            return Err(Error::Config("entity_id must not be empty".into()));
        }
        Ok(config)
    }

    /// Serialize configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

impl CertificateProvider for IdentityProvider {
    fn keys(&self) -> Option<&[KeyConfig]> {
        self.keys.as_deref()
    }

    fn certificate_data(&self) -> Option<&str> {
        self.certificate_data.as_deref()
    }

    fn certificate_file(&self) -> Option<&Path> {
        self.certificate_file.as_deref()
    }

    fn certificate_fingerprints(&self) -> Option<&[String]> {
        self.certificate_fingerprints.as_deref()
    }
}
