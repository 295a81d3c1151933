#![forbid(unsafe_code)]

//! XML Canonicalization (C14N) for signed SAML elements.
//!
//! Implements the four variants an XML-DSig `Reference` or `SignedInfo` may
//! name:
//! - Canonical XML 1.0 (with and without comments)
//! - Exclusive Canonical XML 1.0 (with and without comments)
//!
//! Input is always an element subtree (the apex), optionally with one
//! descendant element cut out. That covers same-document references combined
//! with the enveloped-signature transform, which is all SAML uses.

pub mod escape;
pub mod exclusive;
pub mod inclusive;
pub mod render;

use render::Renderer;
use samlsig_core::{algorithm, Error};

/// The canonicalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C14nMode {
    /// Canonical XML 1.0
    Inclusive,
    /// Canonical XML 1.0 with comments
    InclusiveWithComments,
    /// Exclusive Canonical XML 1.0
    Exclusive,
    /// Exclusive Canonical XML 1.0 with comments
    ExclusiveWithComments,
}

impl C14nMode {
    /// Get the algorithm URI for this mode.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Inclusive => algorithm::C14N,
            Self::InclusiveWithComments => algorithm::C14N_WITH_COMMENTS,
            Self::Exclusive => algorithm::EXC_C14N,
            Self::ExclusiveWithComments => algorithm::EXC_C14N_WITH_COMMENTS,
        }
    }

    /// Parse a C14N mode from an algorithm URI.
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            algorithm::C14N => Some(Self::Inclusive),
            algorithm::C14N_WITH_COMMENTS => Some(Self::InclusiveWithComments),
            algorithm::EXC_C14N => Some(Self::Exclusive),
            algorithm::EXC_C14N_WITH_COMMENTS => Some(Self::ExclusiveWithComments),
            _ => None,
        }
    }

    pub fn with_comments(&self) -> bool {
        matches!(self, Self::InclusiveWithComments | Self::ExclusiveWithComments)
    }

    pub fn is_exclusive(&self) -> bool {
        matches!(self, Self::Exclusive | Self::ExclusiveWithComments)
    }
}

/// Canonicalize the subtree rooted at `apex`.
///
/// - `exclude`: a descendant element left out entirely, with its subtree
///   (the enveloped `ds:Signature`)
/// - `inclusive_prefixes`: for exclusive C14N, the InclusiveNamespaces
///   PrefixList (`#default` names the default namespace); ignored otherwise
pub fn canonicalize_subtree(
    doc: &roxmltree::Document<'_>,
    apex: roxmltree::Node<'_, '_>,
    mode: C14nMode,
    exclude: Option<roxmltree::NodeId>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    if !apex.is_element() {
        return Err(Error::Canonicalization(
            "canonicalization apex must be an element".into(),
        ));
    }
    let renderer = Renderer::new(doc, mode, exclude, inclusive_prefixes);
    let mut output = Vec::new();
    renderer.render_apex(apex, &mut output)?;
    Ok(output)
}

/// Convenience: parse `xml` and canonicalize its document element.
pub fn canonicalize(
    xml: &str,
    mode: C14nMode,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let doc = roxmltree::Document::parse_with_options(xml, samlsig_xml::parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))?;
    canonicalize_subtree(&doc, doc.root_element(), mode, None, inclusive_prefixes)
}
