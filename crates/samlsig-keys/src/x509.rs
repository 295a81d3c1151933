#![forbid(unsafe_code)]

//! X.509 certificate bodies as they travel through SAML documents and
//! configuration: base64 text, PEM framing, SHA-1 fingerprints.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use samlsig_core::Error;

const PEM_LABEL: &str = "CERTIFICATE";

/// A DER-encoded X.509 certificate with its base64 form kept alongside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X509Certificate {
    der: Vec<u8>,
    base64: String,
}

impl X509Certificate {
    /// Build from DER bytes.
    pub fn from_der(der: Vec<u8>) -> Self {
        let base64 = STANDARD.encode(&der);
        Self { der, base64 }
    }

    /// Build from a base64 certificate body; embedded whitespace is ignored.
    pub fn from_base64(body: &str) -> Result<Self, Error> {
        let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
        let der = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| Error::Base64(format!("certificate body: {e}")))?;
        if der.is_empty() {
            return Err(Error::Certificate("empty certificate body".into()));
        }
        Ok(Self {
            der,
            base64: compact,
        })
    }

    /// Parse a single PEM `CERTIFICATE` block.
    pub fn from_pem(pem: &[u8]) -> Result<Self, Error> {
        let (label, der) = pem_rfc7468::decode_vec(trim_ascii(pem))
            .map_err(|e| Error::Certificate(format!("failed to decode certificate PEM: {e}")))?;
        if label != PEM_LABEL {
            return Err(Error::Certificate(format!(
                "expected CERTIFICATE PEM label, got: {label}"
            )));
        }
        Ok(Self::from_der(der))
    }

    /// Find the first PEM `CERTIFICATE` block in arbitrary text (a file
    /// that may also carry a private key or comments).
    pub fn first_in_text(text: &str) -> Result<Self, Error> {
        const BEGIN: &str = "-----BEGIN CERTIFICATE-----";
        const END: &str = "-----END CERTIFICATE-----";
        let start = text
            .find(BEGIN)
            .ok_or_else(|| Error::Certificate("no PEM certificate found".into()))?;
        let body_start = start + BEGIN.len();
        let end = text[body_start..]
            .find(END)
            .ok_or_else(|| Error::Certificate("unterminated PEM certificate".into()))?;
        Self::from_base64(&text[body_start..body_start + end])
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// The base64 body without whitespace, as embedded in `ds:X509Certificate`.
    pub fn base64(&self) -> &str {
        &self.base64
    }

    /// PEM framing with 64-column lines.
    pub fn to_pem(&self) -> Result<String, Error> {
        pem_rfc7468::encode_string(PEM_LABEL, pem_rfc7468::LineEnding::LF, &self.der)
            .map_err(|e| Error::Certificate(format!("failed to encode certificate PEM: {e}")))
    }

    /// Lowercase hex SHA-1 over the DER bytes.
    pub fn fingerprint(&self) -> String {
        hex::encode(samlsig_crypto::digest::sha1(&self.der))
    }

    /// The RSA public key from the certificate's SubjectPublicKeyInfo.
    pub fn rsa_public_key(&self) -> Result<rsa::RsaPublicKey, Error> {
        use der::{Decode, Encode};
        use spki::DecodePublicKey;

        let cert = x509_cert::Certificate::from_der(&self.der)
            .map_err(|e| Error::Certificate(format!("failed to parse X.509 certificate: {e}")))?;
        let spki_der = cert
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| Error::Certificate(format!("failed to encode SPKI: {e}")))?;
        rsa::RsaPublicKey::from_public_key_der(&spki_der)
            .map_err(|e| Error::Key(format!("certificate does not carry an RSA key: {e}")))
    }
}

/// Normalize a configured fingerprint: lowercase, colons and whitespace
/// removed.
pub fn normalize_fingerprint(fingerprint: &str) -> String {
    fingerprint
        .chars()
        .filter(|c| *c != ':' && !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn trim_ascii(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let end = data
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |p| p + 1);
    &data[start..end]
}
