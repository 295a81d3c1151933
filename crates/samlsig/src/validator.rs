#![forbid(unsafe_code)]

//! The validator most callers want: configured keys first, pinned
//! fingerprints second.

use crate::configuration::CertificateProvider;
use crate::fingerprint_validator::FingerprintValidator;
use crate::public_key_validator::PublicKeyValidator;
use crate::signed_element::SignedElement;
use crate::validator_chain::ValidatorChain;
use samlsig_core::Error;

/// A [`ValidatorChain`] of [`PublicKeyValidator`] then
/// [`FingerprintValidator`].
#[derive(Debug)]
pub struct SignatureValidator {
    chain: ValidatorChain,
}

impl SignatureValidator {
    pub fn new() -> Self {
        let mut chain = ValidatorChain::default();
        chain.append_validator(PublicKeyValidator::new());
        chain.append_validator(FingerprintValidator::new());
        Self { chain }
    }

    /// Whether `element` carries a signature `configuration` trusts.
    ///
    /// # Errors
    ///
    /// [`Error::MissingConfiguration`] when the configuration offers neither
    /// signing keys nor fingerprints matching the element's certificates.
    pub fn has_valid_signature(
        &self,
        element: &SignedElement,
        configuration: &dyn CertificateProvider,
    ) -> Result<bool, Error> {
        self.chain.has_valid_signature(element, configuration)
    }

    pub fn chain(&self) -> &ValidatorChain {
        &self.chain
    }
}

impl Default for SignatureValidator {
    fn default() -> Self {
        Self::new()
    }
}
