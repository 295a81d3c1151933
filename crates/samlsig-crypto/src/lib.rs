#![forbid(unsafe_code)]

//! Cryptographic primitives for SAML signatures.
//!
//! Reference digests and RSA PKCS#1 v1.5 signatures, looked up by the
//! algorithm URI written in the signature.

pub mod digest;
pub mod sign;

pub use digest::DigestMethod;
pub use sign::{SignatureAlgorithm, SigningKey};
