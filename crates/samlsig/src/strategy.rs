#![forbid(unsafe_code)]

//! The trust strategy contract.
//!
//! A strategy first says whether it has what it needs to judge an element
//! for a given identity provider, then renders a verdict.  A verdict of
//! `false` from an applicable strategy is final for the chain.

use crate::configuration::CertificateProvider;
use crate::signed_element::SignedElement;
use samlsig_core::Error;
use samlsig_keys::Key;

/// Outcome of asking one strategy about one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    /// The strategy lacks the inputs to decide.
    NotApplicable,
    /// The strategy decided.
    Verdict(bool),
}

/// A way of deciding whether an element's signature is trusted.
pub trait TrustStrategy: Send + Sync {
    /// Name used in log output.
    fn name(&self) -> &str;

    /// Whether this strategy can judge `element` under `configuration`.
    fn can_validate(&self, element: &SignedElement, configuration: &dyn CertificateProvider) -> bool;

    /// The verdict.  Only meaningful when [`can_validate`] returned `true`.
    ///
    /// [`can_validate`]: TrustStrategy::can_validate
    fn has_valid_signature(
        &self,
        element: &SignedElement,
        configuration: &dyn CertificateProvider,
    ) -> Result<bool, Error>;

    /// Applicability and verdict in one call.
    ///
    /// Strategies that load key material to answer both questions can
    /// override this to do the work once.
    fn assess(
        &self,
        element: &SignedElement,
        configuration: &dyn CertificateProvider,
    ) -> Result<Assessment, Error> {
        if !self.can_validate(element, configuration) {
            return Ok(Assessment::NotApplicable);
        }
        self.has_valid_signature(element, configuration)
            .map(Assessment::Verdict)
    }
}

/// Try `keys` against `element` in order.
///
/// The first key that validates wins.  A key that fails is logged and the
/// next one is tried.  An unsigned element ends the search with `false`.
pub(crate) fn validate_element_with_keys<'a, I>(element: &SignedElement, keys: I) -> bool
where
    I: IntoIterator<Item = &'a Key>,
{
    for (index, key) in keys.into_iter().enumerate() {
        match element.validate(key) {
            Ok(true) => {
                tracing::debug!(index, key = key.name().unwrap_or(""), "key validates element");
                return true;
            }
            Ok(false) => {
                tracing::debug!("element is not signed");
                return false;
            }
            Err(e) => {
                tracing::debug!(index, error = %e, "key does not validate element");
            }
        }
    }
    tracing::debug!("no configured key validates element");
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::IdentityProvider;
    use samlsig_core::algorithm;
    use samlsig_keys::{loader, KeyUsage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn key(name: &str) -> Key {
        let pem = std::fs::read(format!("../../test-data/keys/{name}.crt.pem")).unwrap();
        loader::load_x509_cert_pem(&pem, algorithm::RSA_SHA256, KeyUsage::Signing)
            .unwrap()
            .with_name(name)
    }

    /// An element whose single entry accepts only keys named `accepted`.
    fn element_accepting(accepted: &'static str, calls: Arc<AtomicUsize>) -> SignedElement {
        let mut element = SignedElement::new();
        element.add_validator(move |key: &Key| {
            calls.fetch_add(1, Ordering::SeqCst);
            if key.name() == Some(accepted) {
                Ok(())
            } else {
                Err(Error::VerificationFailure("wrong key".into()))
            }
        });
        element
    }

    struct Fixed {
        applicable: bool,
        verdict: bool,
    }

    impl TrustStrategy for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn can_validate(&self, _: &SignedElement, _: &dyn CertificateProvider) -> bool {
            self.applicable
        }

        fn has_valid_signature(&self, _: &SignedElement, _: &dyn CertificateProvider) -> Result<bool, Error> {
            Ok(self.verdict)
        }
    }

    #[test]
    fn default_assess() {
        let element = SignedElement::new();
        let idp = IdentityProvider::new("idp");
        let cases = [
            (false, true, Assessment::NotApplicable),
            (true, true, Assessment::Verdict(true)),
            (true, false, Assessment::Verdict(false)),
        ];
        for (applicable, verdict, expected) in cases {
            let strategy = Fixed { applicable, verdict };
            assert_eq!(strategy.assess(&element, &idp).unwrap(), expected);
        }
    }

    #[test]
    fn later_key_can_validate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let element = element_accepting("idp-rollover", Arc::clone(&calls));
        let keys = [key("unrelated"), key("idp-rollover"), key("idp")];
        assert!(validate_element_with_keys(&element, &keys));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn exhausted_keys_do_not_validate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let element = element_accepting("idp", Arc::clone(&calls));
        let keys = [key("unrelated"), key("idp-rollover")];
        assert!(!validate_element_with_keys(&element, &keys));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!validate_element_with_keys(&element, std::iter::empty::<&Key>()));
    }

    #[test]
    fn unsigned_element_stops_at_first_key() {
        let keys = [key("unrelated"), key("idp")];
        assert!(!validate_element_with_keys(&SignedElement::new(), &keys));
    }
}
