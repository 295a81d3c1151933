#![forbid(unsafe_code)]

//! Enveloped XML Digital Signatures over SAML elements.
//!
//! - [`verify::parse_signature`] checks the structure and reference digests of
//!   the `ds:Signature` directly under an element
//! - [`verify::verify_signature`] checks the `SignatureValue` with one key
//! - [`sign::insert_signature`] signs a document element in place

pub mod sign;
pub mod verify;

pub use sign::{insert_signature, ChildRef};
pub use verify::{parse_signature, verify_signature, SignatureInfo};
