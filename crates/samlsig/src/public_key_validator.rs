#![forbid(unsafe_code)]

//! Trust by configured signing keys.

use crate::configuration::CertificateProvider;
use crate::key_loader::KeyLoader;
use crate::signed_element::SignedElement;
use crate::strategy::{validate_element_with_keys, Assessment, TrustStrategy};
use samlsig_core::Error;
use samlsig_keys::{KeyCollection, KeyUsage};

/// Accepts an element when one of the identity provider's configured
/// signing certificates validates it.
#[derive(Debug, Default, Clone, Copy)]
pub struct PublicKeyValidator;

impl PublicKeyValidator {
    pub fn new() -> Self {
        Self
    }

    /// The configured signing keys that carry a certificate, or `None` when
    /// there are none (or they cannot be loaded).
    fn configured_keys(configuration: &dyn CertificateProvider) -> Option<KeyCollection> {
        match KeyLoader::extract_public_keys(configuration, KeyUsage::Signing, false) {
            Ok(keys) => {
                let keys = keys.filter(|key| key.certificate().is_some());
                (!keys.is_empty()).then_some(keys)
            }
            Err(e) => {
                tracing::debug!(error = %e, "cannot load configured signing keys");
                None
            }
        }
    }
}

impl TrustStrategy for PublicKeyValidator {
    fn name(&self) -> &str {
        "public-key"
    }

    fn can_validate(&self, _element: &SignedElement, configuration: &dyn CertificateProvider) -> bool {
        Self::configured_keys(configuration).is_some()
    }

    fn has_valid_signature(
        &self,
        element: &SignedElement,
        configuration: &dyn CertificateProvider,
    ) -> Result<bool, Error> {
        let keys = KeyLoader::extract_public_keys(configuration, KeyUsage::Signing, true)?;
        let keys = keys.filter(|key| key.certificate().is_some());
        tracing::debug!(keys = keys.len(), "validating with configured signing keys");
        Ok(validate_element_with_keys(element, &keys))
    }

    fn assess(
        &self,
        element: &SignedElement,
        configuration: &dyn CertificateProvider,
    ) -> Result<Assessment, Error> {
        let Some(keys) = Self::configured_keys(configuration) else {
            return Ok(Assessment::NotApplicable);
        };
        tracing::debug!(keys = keys.len(), "validating with configured signing keys");
        Ok(Assessment::Verdict(validate_element_with_keys(element, &keys)))
    }
}
