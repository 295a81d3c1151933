#![forbid(unsafe_code)]

//! Key material for SAML signature validation.
//!
//! Provides the immutable [`Key`] handle, the type-checked [`KeyCollection`],
//! X.509 certificate helpers, PEM/DER loaders and extraction of candidate
//! certificates from `ds:KeyInfo`.

pub mod collection;
pub mod key;
pub mod keyinfo;
pub mod loader;
pub mod x509;

pub use collection::KeyCollection;
pub use key::{Key, KeyUsage};
pub use x509::X509Certificate;
