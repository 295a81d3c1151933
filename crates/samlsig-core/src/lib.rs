#![forbid(unsafe_code)]

//! Core types shared by every samlsig crate: the error enum plus the
//! namespace and algorithm URI constants used when reading and writing
//! SAML signatures.

pub mod algorithm;
pub mod error;
pub mod ns;

pub use error::{Error, Result};
