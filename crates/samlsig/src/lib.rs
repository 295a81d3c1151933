#![forbid(unsafe_code)]

//! SAML2 signature trust.
//!
//! A [`SignedElement`] records what an incoming element's embedded
//! signature can prove; a [`ValidatorChain`] of [`TrustStrategy`]s decides
//! whether that proof is acceptable for a given identity provider.
//! [`SignatureValidator`] is the chain most callers want.

pub use samlsig_c14n as c14n;
pub use samlsig_core as core;
pub use samlsig_crypto as crypto;
pub use samlsig_dsig as dsig;
pub use samlsig_keys as keys;
pub use samlsig_xml as xml;

pub mod configuration;
pub mod fingerprint_validator;
pub mod key_loader;
pub mod public_key_validator;
pub mod signed_element;
pub mod strategy;
pub mod validator;
pub mod validator_chain;

pub use configuration::{CertificateProvider, IdentityProvider, KeyConfig};
pub use fingerprint_validator::FingerprintValidator;
pub use key_loader::KeyLoader;
pub use public_key_validator::PublicKeyValidator;
pub use samlsig_core::{Error, Result};
pub use samlsig_dsig::ChildRef;
pub use samlsig_keys::{Key, KeyCollection, KeyUsage};
pub use signed_element::{SignedElement, VerificationTask};
pub use strategy::{Assessment, TrustStrategy};
pub use validator::SignatureValidator;
pub use validator_chain::ValidatorChain;
