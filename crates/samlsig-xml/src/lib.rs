#![forbid(unsafe_code)]

//! XML document abstraction for the samlsig library.
//!
//! Wraps `roxmltree` with the lookups signature processing needs: namespaced
//! child queries, an ID map that refuses duplicate IDs, source-level
//! qualified names, and text splicing for inserting new elements.

pub mod document;

/// Return roxmltree parsing options for untrusted SAML input.
///
/// DTDs are refused; SAML messages never carry one.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: false,
        ..roxmltree::ParsingOptions::default()
    }
}
