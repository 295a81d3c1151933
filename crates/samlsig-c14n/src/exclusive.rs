#![forbid(unsafe_code)]

//! Exclusive XML Canonicalization 1.0 namespace handling.
//!
//! Only "visibly utilized" prefixes are declared: the element's own prefix
//! and the prefixes of its attributes, plus whatever the InclusiveNamespaces
//! PrefixList names.  A declaration is emitted when the nearest output
//! ancestor has not already rendered the same binding.

use crate::render::{NsDecl, RenderedNs};
use samlsig_core::ns;
use std::collections::{BTreeSet, HashSet};

/// Namespace declarations the start tag of `node` must carry.
pub(crate) fn namespace_decls<'input>(
    doc: &roxmltree::Document<'input>,
    node: roxmltree::Node<'_, 'input>,
    rendered: &RenderedNs,
    inclusive_prefixes: &HashSet<String>,
) -> Vec<NsDecl> {
    let mut utilized: BTreeSet<&str> = BTreeSet::new();
    utilized.insert(samlsig_xml::document::element_prefix(doc, node));

    for attr in node.attributes() {
        if let Some(attr_ns) = attr.namespace() {
            if attr_ns == ns::XML {
                continue;
            }
            let prefix = samlsig_xml::document::attribute_prefix(doc, &attr);
            if !prefix.is_empty() {
                utilized.insert(prefix);
            }
        }
    }

    for prefix in inclusive_prefixes {
        if prefix == "#default" {
            utilized.insert("");
        } else {
            utilized.insert(prefix.as_str());
        }
    }

    let mut decls = Vec::new();
    for prefix in utilized {
        if prefix == "xml" {
            continue;
        }
        let lookup = if prefix.is_empty() { None } else { Some(prefix) };
        match node.lookup_namespace_uri(lookup).filter(|uri| !uri.is_empty()) {
            Some(uri) => {
                if rendered.get(prefix).map(String::as_str) != Some(uri) {
                    decls.push(NsDecl::new(prefix, uri));
                }
            }
            None => {
                // An unbound default namespace only needs `xmlns=""` when an
                // output ancestor declared a non-empty one.
                if prefix.is_empty()
                    && rendered.get("").map_or(false, |uri| !uri.is_empty())
                {
                    decls.push(NsDecl::new("", ""));
                }
            }
        }
    }
    decls
}
