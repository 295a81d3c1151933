#![forbid(unsafe_code)]

//! An ordered chain of trust strategies.
//!
//! The first strategy that is applicable decides; strategies after it are
//! never consulted, even when its verdict is negative.  A chain in which no
//! strategy is applicable reports a configuration problem rather than a
//! failed signature.

use crate::configuration::CertificateProvider;
use crate::signed_element::SignedElement;
use crate::strategy::{Assessment, TrustStrategy};
use samlsig_core::Error;

/// Strategies consulted in append order.
#[derive(Default)]
pub struct ValidatorChain {
    validators: Vec<Box<dyn TrustStrategy>>,
}

impl ValidatorChain {
    pub fn new(validators: Vec<Box<dyn TrustStrategy>>) -> Self {
        Self { validators }
    }

    /// Add a strategy after the existing ones.
    pub fn append_validator<T>(&mut self, validator: T)
    where
        T: TrustStrategy + 'static,
    {
        self.validators.push(Box::new(validator));
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Names of the strategies, in order.
    pub fn names(&self) -> Vec<&str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Ask each strategy in turn; the first applicable one decides.
    ///
    /// An applicable strategy that fails with an error counts as a negative
    /// verdict.
    ///
    /// # Errors
    ///
    /// [`Error::MissingConfiguration`] when no strategy is applicable.
    pub fn has_valid_signature(
        &self,
        element: &SignedElement,
        configuration: &dyn CertificateProvider,
    ) -> Result<bool, Error> {
        for validator in &self.validators {
            let verdict = match validator.assess(element, configuration) {
                Ok(Assessment::NotApplicable) => {
                    tracing::debug!(validator = validator.name(), "not applicable, skipping");
                    continue;
                }
                Ok(Assessment::Verdict(verdict)) => verdict,
                Err(e) => {
                    tracing::warn!(validator = validator.name(), error = %e, "validator failed");
                    false
                }
            };
            tracing::debug!(validator = validator.name(), verdict, "validator decided");
            return Ok(verdict);
        }

        Err(Error::MissingConfiguration(format!(
            "none of the {} configured validators can validate this element",
            self.validators.len()
        )))
    }
}

impl std::fmt::Debug for ValidatorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorChain")
            .field("validators", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::IdentityProvider;

    struct Broken;

    impl TrustStrategy for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn can_validate(&self, _: &SignedElement, _: &dyn CertificateProvider) -> bool {
            true
        }

        fn has_valid_signature(&self, _: &SignedElement, _: &dyn CertificateProvider) -> Result<bool, Error> {
            Err(Error::Certificate("unreadable".into()))
        }
    }

    struct Accepting;

    impl TrustStrategy for Accepting {
        fn name(&self) -> &str {
            "accepting"
        }

        fn can_validate(&self, _: &SignedElement, _: &dyn CertificateProvider) -> bool {
            true
        }

        fn has_valid_signature(&self, _: &SignedElement, _: &dyn CertificateProvider) -> Result<bool, Error> {
            Ok(true)
        }
    }

    #[test]
    fn empty_chain_is_missing_configuration() {
        let chain = ValidatorChain::default();
        assert!(chain.is_empty());
        let err = chain
            .has_valid_signature(&SignedElement::new(), &IdentityProvider::new("idp"))
            .unwrap_err();
        assert!(err.is_missing_configuration());
    }

    #[test]
    fn strategy_error_is_a_final_negative_verdict() {
        let mut chain = ValidatorChain::new(vec![Box::new(Broken)]);
        chain.append_validator(Accepting);
        assert_eq!(chain.names(), ["broken", "accepting"]);
        assert!(!chain
            .has_valid_signature(&SignedElement::new(), &IdentityProvider::new("idp"))
            .unwrap());
    }
}
