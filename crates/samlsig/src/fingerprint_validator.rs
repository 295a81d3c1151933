#![forbid(unsafe_code)]

//! Trust by pinned certificate fingerprints.
//!
//! The certificates come from the element's own `ds:KeyInfo`; only those
//! whose SHA-1 fingerprint the identity provider pinned are tried.

use crate::configuration::CertificateProvider;
use crate::signed_element::SignedElement;
use crate::strategy::{validate_element_with_keys, TrustStrategy};
use samlsig_core::{algorithm, Error};
use samlsig_keys::x509::normalize_fingerprint;
use samlsig_keys::{loader, KeyCollection, KeyUsage, X509Certificate};
use std::collections::HashSet;

/// Accepts an element signed by one of its embedded certificates when that
/// certificate's fingerprint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FingerprintValidator;

impl FingerprintValidator {
    pub fn new() -> Self {
        Self
    }

    /// Keys for the candidate certificates whose fingerprint is pinned.
    fn matching_keys(element: &SignedElement, fingerprints: &[String]) -> KeyCollection {
        let pinned: HashSet<String> = fingerprints.iter().map(|f| normalize_fingerprint(f)).collect();
        let mut keys = KeyCollection::new();
        for (index, body) in element.candidate_certificates().iter().enumerate() {
            let cert = match X509Certificate::from_base64(body) {
                Ok(cert) => cert,
                Err(e) => {
                    tracing::debug!(index, error = %e, "skipping undecodable candidate certificate");
                    continue;
                }
            };
            let fingerprint = cert.fingerprint();
            if !pinned.contains(&fingerprint) {
                tracing::debug!(index, %fingerprint, "candidate certificate is not pinned");
                continue;
            }
            match loader::load_x509_cert(cert, algorithm::RSA_SHA256, KeyUsage::Signing) {
                Ok(key) => keys.push(key.with_name(fingerprint)),
                Err(e) => tracing::debug!(index, error = %e, "skipping unusable candidate certificate"),
            }
        }
        keys
    }
}

impl TrustStrategy for FingerprintValidator {
    fn name(&self) -> &str {
        "fingerprint"
    }

    fn can_validate(&self, element: &SignedElement, configuration: &dyn CertificateProvider) -> bool {
        configuration
            .certificate_fingerprints()
            .is_some_and(|f| !f.is_empty())
            && !element.candidate_certificates().is_empty()
    }

    fn has_valid_signature(
        &self,
        element: &SignedElement,
        configuration: &dyn CertificateProvider,
    ) -> Result<bool, Error> {
        let fingerprints = configuration.certificate_fingerprints().unwrap_or_default();
        let keys = Self::matching_keys(element, fingerprints);
        if keys.is_empty() {
            tracing::debug!(
                candidates = element.candidate_certificates().len(),
                "no candidate certificate matches a configured fingerprint"
            );
            return Ok(false);
        }
        Ok(validate_element_with_keys(element, &keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::IdentityProvider;

    const IDP_FINGERPRINT: &str = "7C:1A:6A:DE:3F:38:E0:11:0C:53:B1:E1:8A:D5:AE:AE:BE:ED:F9:67";

    fn response() -> SignedElement {
        let xml = std::fs::read_to_string("../../test-data/saml/response-signed-rollover.xml").unwrap();
        SignedElement::from_xml(&xml).unwrap()
    }

    fn rollover_fingerprint() -> String {
        let pem = std::fs::read_to_string("../../test-data/keys/idp-rollover.crt.pem").unwrap();
        X509Certificate::first_in_text(&pem).unwrap().fingerprint()
    }

    #[test]
    fn applicability() {
        let validator = FingerprintValidator::new();
        let pinned = IdentityProvider::new("idp").with_certificate_fingerprints(vec![IDP_FINGERPRINT.into()]);

        assert!(validator.can_validate(&response(), &pinned));
        assert!(!validator.can_validate(&SignedElement::new(), &pinned));
        assert!(!validator.can_validate(&response(), &IdentityProvider::new("idp")));
        assert!(!validator.can_validate(
            &response(),
            &IdentityProvider::new("idp").with_certificate_fingerprints(Vec::new())
        ));
    }

    #[test]
    fn pinned_signer_validates() {
        let pinned = IdentityProvider::new("idp")
            .with_certificate_fingerprints(vec![rollover_fingerprint().to_uppercase()]);
        assert!(FingerprintValidator::new()
            .has_valid_signature(&response(), &pinned)
            .unwrap());
    }

    #[test]
    fn pinned_certificate_that_did_not_sign() {
        // The idp certificate is embedded but the rollover key signed.
        let pinned = IdentityProvider::new("idp").with_certificate_fingerprints(vec![IDP_FINGERPRINT.into()]);
        assert!(!FingerprintValidator::new()
            .has_valid_signature(&response(), &pinned)
            .unwrap());
    }

    #[test]
    fn nothing_pinned_matches() {
        let pinned = IdentityProvider::new("idp").with_certificate_fingerprints(vec!["00:11".into()]);
        assert!(!FingerprintValidator::new()
            .has_valid_signature(&response(), &pinned)
            .unwrap());
    }
}
