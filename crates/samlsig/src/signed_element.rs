#![forbid(unsafe_code)]

//! An XML element that may carry an embedded signature.
//!
//! Signature presence and signature acceptance are kept apart: building a
//! [`SignedElement`] never fails because of a broken `ds:Signature`, it only
//! ends up with nothing to validate.  Whether a key actually vouches for the
//! element is asked later through [`SignedElement::validate`].

use samlsig_core::{algorithm, Error};
use samlsig_dsig::{ChildRef, SignatureInfo};
use samlsig_keys::{loader, Key, KeyUsage, X509Certificate};

/// One way of proving an element authentic, checked against a candidate key.
pub trait VerificationTask: Send + Sync {
    /// `Ok(())` when `key` verifies; otherwise the reason it did not.
    fn verify(&self, key: &Key) -> Result<(), Error>;
}

impl<F> VerificationTask for F
where
    F: Fn(&Key) -> Result<(), Error> + Send + Sync,
{
    fn verify(&self, key: &Key) -> Result<(), Error> {
        self(key)
    }
}

/// The `ds:Signature` embedded in the element itself.
struct EmbeddedSignature {
    info: SignatureInfo,
}

impl VerificationTask for EmbeddedSignature {
    fn verify(&self, key: &Key) -> Result<(), Error> {
        samlsig_dsig::verify_signature(&self.info, key)
    }
}

/// Signature state of one SAML element.
#[derive(Default)]
pub struct SignedElement {
    validators: Vec<Box<dyn VerificationTask>>,
    candidate_certificates: Vec<String>,
    valid_until: Option<i64>,
    cache_duration: Option<String>,
    signature_key: Option<Key>,
    signing_certificates: Vec<String>,
}

impl SignedElement {
    /// An element with no signature and nothing configured for signing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect `element` for a direct `ds:Signature` child.
    ///
    /// A missing or unusable signature leaves the element unsigned.
    pub fn from_node(element: roxmltree::Node<'_, '_>) -> Self {
        let mut signed = Self::new();
        if let Some(info) = embedded_signature(element) {
            signed.candidate_certificates = info.certificates().to_vec();
            signed.add_validator(EmbeddedSignature { info });
        }
        signed
    }

    /// Parse `xml` and inspect its document element.
    ///
    /// Only a document that is not well-formed XML is an error.
    pub fn from_xml(xml: &str) -> Result<Self, Error> {
        let doc = roxmltree::Document::parse_with_options(xml, samlsig_xml::parsing_options())
            .map_err(|e| Error::XmlParse(e.to_string()))?;
        Ok(Self::from_node(doc.root_element()))
    }

    /// Append a validator entry.  Nothing is checked until [`validate`].
    ///
    /// [`validate`]: SignedElement::validate
    pub fn add_validator<T>(&mut self, task: T)
    where
        T: VerificationTask + 'static,
    {
        self.validators.push(Box::new(task));
    }

    /// Check the element against `key`.
    ///
    /// - `Ok(false)`: there is nothing to validate, the element is unsigned
    /// - `Ok(true)`: a validator entry accepted the key; later entries are
    ///   not tried
    /// - `Err(_)`: every entry rejected the key; the first entry's error is
    ///   returned
    pub fn validate(&self, key: &Key) -> Result<bool, Error> {
        if self.validators.is_empty() {
            tracing::debug!("element carries no signature to validate");
            return Ok(false);
        }

        let mut first_error = None;
        for (index, task) in self.validators.iter().enumerate() {
            match task.verify(key) {
                Ok(()) => return Ok(true),
                Err(e) => {
                    tracing::debug!(index, error = %e, "validator entry rejected key");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(false),
        }
    }

    /// The candidate certificates whose public key validates this element,
    /// in their original order.
    ///
    /// A certificate that cannot be loaded or does not validate is left out.
    pub fn validating_certificates(&self) -> Vec<String> {
        self.candidate_certificates
            .iter()
            .filter(|cert| match self.certificate_validates(cert) {
                Ok(valid) => valid,
                Err(e) => {
                    tracing::debug!(error = %e, "candidate certificate does not validate");
                    false
                }
            })
            .cloned()
            .collect()
    }

    fn certificate_validates(&self, certificate: &str) -> Result<bool, Error> {
        let pem = X509Certificate::from_base64(certificate)?.to_pem()?;
        let key = loader::load_x509_cert_pem(pem.as_bytes(), algorithm::RSA_SHA256, KeyUsage::Signing)?;
        self.validate(&key)
    }

    /// Sign the document element of `xml` with the configured signature key.
    ///
    /// Returns `Ok(None)` and leaves `xml` alone when no key is configured.
    /// The signing certificates go into `ds:KeyInfo`; the signature is placed
    /// before `insert_before`, or last when that is `None`.
    pub fn sign(&self, xml: &str, insert_before: Option<&ChildRef>) -> Result<Option<String>, Error> {
        let Some(key) = &self.signature_key else {
            return Ok(None);
        };
        samlsig_dsig::insert_signature(key, &self.signing_certificates, xml, insert_before).map(Some)
    }

    /// Number of validator entries.
    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    /// True if there is at least one validator entry.
    pub fn is_signed(&self) -> bool {
        !self.validators.is_empty()
    }

    /// Certificates found in the embedded signature's `ds:KeyInfo`.
    pub fn candidate_certificates(&self) -> &[String] {
        &self.candidate_certificates
    }

    pub fn signature_key(&self) -> Option<&Key> {
        self.signature_key.as_ref()
    }

    pub fn set_signature_key(&mut self, key: Option<Key>) {
        self.signature_key = key;
    }

    /// Certificates embedded when this element is signed.
    pub fn signing_certificates(&self) -> &[String] {
        &self.signing_certificates
    }

    pub fn set_signing_certificates(&mut self, certificates: Vec<String>) {
        self.signing_certificates = certificates;
    }

    /// End of the validity window, unix seconds.
    pub fn valid_until(&self) -> Option<i64> {
        self.valid_until
    }

    pub fn set_valid_until(&mut self, valid_until: Option<i64>) {
        self.valid_until = valid_until;
    }

    /// Cache duration hint as written (`xs:duration`, e.g. `PT1H`).
    pub fn cache_duration(&self) -> Option<&str> {
        self.cache_duration.as_deref()
    }

    pub fn set_cache_duration(&mut self, cache_duration: Option<String>) {
        self.cache_duration = cache_duration;
    }
}

impl std::fmt::Debug for SignedElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedElement")
            .field("validators", &self.validators.len())
            .field("candidate_certificates", &self.candidate_certificates.len())
            .field("valid_until", &self.valid_until)
            .field("cache_duration", &self.cache_duration)
            .field("signature_key", &self.signature_key)
            .field("signing_certificates", &self.signing_certificates.len())
            .finish()
    }
}

/// The usable signature of `element`, if any.  Problems are logged here and
/// nowhere else.
fn embedded_signature(element: roxmltree::Node<'_, '_>) -> Option<SignatureInfo> {
    match samlsig_dsig::parse_signature(element) {
        Ok(info) => info,
        Err(e) => {
            tracing::debug!(
                element = element.tag_name().name(),
                error = %e,
                "ignoring unusable signature"
            );
            None
        }
    }
}
