#![forbid(unsafe_code)]

//! Shared rendering for both C14N variants.
//!
//! The variants only disagree on which namespace declarations an element
//! start tag carries; everything else (attribute order, escaping, empty
//! element expansion, comment handling) lives here.

use crate::{escape, exclusive, inclusive, C14nMode};
use samlsig_core::{ns, Error};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// Namespace bindings already rendered on output ancestors, prefix → URI.
pub type RenderedNs = BTreeMap<String, String>;

/// A namespace declaration to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsDecl {
    /// The prefix ("" for default namespace).
    pub prefix: String,
    /// The namespace URI ("" only when undeclaring the default namespace).
    pub uri: String,
}

impl NsDecl {
    pub fn new(prefix: &str, uri: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            uri: uri.to_owned(),
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        if self.prefix.is_empty() {
            out.extend_from_slice(b" xmlns=\"");
        } else {
            out.extend_from_slice(b" xmlns:");
            out.extend_from_slice(self.prefix.as_bytes());
            out.extend_from_slice(b"=\"");
        }
        escape::push_attr(out, &self.uri);
        out.push(b'"');
    }
}

impl Ord for NsDecl {
    // Default namespace first, then by prefix.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .prefix
            .is_empty()
            .cmp(&self.prefix.is_empty())
            .then_with(|| self.prefix.cmp(&other.prefix))
    }
}

impl PartialOrd for NsDecl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An attribute to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// The namespace URI of the attribute ("" for no namespace).
    pub ns_uri: String,
    pub local_name: String,
    /// The qualified name (prefix:local or just local).
    pub qualified_name: String,
    pub value: String,
}

impl Attr {
    fn write(&self, out: &mut Vec<u8>) {
        out.push(b' ');
        out.extend_from_slice(self.qualified_name.as_bytes());
        out.extend_from_slice(b"=\"");
        escape::push_attr(out, &self.value);
        out.push(b'"');
    }
}

impl Ord for Attr {
    // Unqualified attributes first (by local name), then by (URI, local name).
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .ns_uri
            .is_empty()
            .cmp(&self.ns_uri.is_empty())
            .then_with(|| self.ns_uri.cmp(&other.ns_uri))
            .then_with(|| self.local_name.cmp(&other.local_name))
    }
}

impl PartialOrd for Attr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub(crate) struct Renderer<'a, 'input> {
    doc: &'a roxmltree::Document<'input>,
    mode: C14nMode,
    exclude: Option<roxmltree::NodeId>,
    inclusive_prefixes: HashSet<String>,
}

impl<'a, 'input> Renderer<'a, 'input> {
    pub(crate) fn new(
        doc: &'a roxmltree::Document<'input>,
        mode: C14nMode,
        exclude: Option<roxmltree::NodeId>,
        inclusive_prefixes: &[String],
    ) -> Self {
        Self {
            doc,
            mode,
            exclude,
            inclusive_prefixes: inclusive_prefixes.iter().cloned().collect(),
        }
    }

    pub(crate) fn render_apex(
        &self,
        apex: roxmltree::Node<'_, 'input>,
        output: &mut Vec<u8>,
    ) -> Result<(), Error> {
        self.element(apex, output, &RenderedNs::new(), true)
    }

    fn element(
        &self,
        node: roxmltree::Node<'_, 'input>,
        output: &mut Vec<u8>,
        rendered_ns: &RenderedNs,
        is_apex: bool,
    ) -> Result<(), Error> {
        if Some(node.id()) == self.exclude {
            return Ok(());
        }

        let mut ns_decls = if self.mode.is_exclusive() {
            exclusive::namespace_decls(self.doc, node, rendered_ns, &self.inclusive_prefixes)
        } else {
            inclusive::namespace_decls(node, rendered_ns)
        };
        ns_decls.sort();

        let mut attrs = self.attributes(node)?;
        if is_apex && !self.mode.is_exclusive() {
            inclusive::inherit_xml_attributes(node, &mut attrs);
        }
        attrs.sort();

        let elem_name = samlsig_xml::document::qualified_name(self.doc, node);

        output.push(b'<');
        output.extend_from_slice(elem_name.as_bytes());
        for decl in &ns_decls {
            decl.write(output);
        }
        for attr in &attrs {
            attr.write(output);
        }
        output.push(b'>');

        let mut child_ns = rendered_ns.clone();
        for decl in ns_decls {
            child_ns.insert(decl.prefix, decl.uri);
        }

        for child in node.children() {
            match child.node_type() {
                roxmltree::NodeType::Element => {
                    self.element(child, output, &child_ns, false)?;
                }
                roxmltree::NodeType::Text => {
                    escape::push_text(output, child.text().unwrap_or(""));
                }
                roxmltree::NodeType::Comment => {
                    if self.mode.with_comments() {
                        output.extend_from_slice(b"<!--");
                        output.extend_from_slice(child.text().unwrap_or("").as_bytes());
                        output.extend_from_slice(b"-->");
                    }
                }
                roxmltree::NodeType::PI => {
                    if let Some(pi) = child.pi() {
                        output.extend_from_slice(b"<?");
                        output.extend_from_slice(pi.target.as_bytes());
                        if let Some(value) = pi.value.filter(|v| !v.is_empty()) {
                            output.push(b' ');
                            escape::push_pi(output, value);
                        }
                        output.extend_from_slice(b"?>");
                    }
                }
                roxmltree::NodeType::Root => {}
            }
        }

        output.extend_from_slice(b"</");
        output.extend_from_slice(elem_name.as_bytes());
        output.push(b'>');
        Ok(())
    }

    fn attributes(&self, node: roxmltree::Node<'_, 'input>) -> Result<Vec<Attr>, Error> {
        let mut attrs = Vec::new();
        for attr in node.attributes() {
            let ns_uri = attr.namespace().unwrap_or("");
            let qualified_name = if ns_uri.is_empty() {
                attr.name().to_owned()
            } else if ns_uri == ns::XML {
                format!("xml:{}", attr.name())
            } else {
                let qname = samlsig_xml::document::attribute_qualified_name(self.doc, &attr);
                if !qname.contains(':') {
                    return Err(Error::Canonicalization(format!(
                        "no prefix bound for attribute namespace {ns_uri}"
                    )));
                }
                qname.to_owned()
            };
            attrs.push(Attr {
                ns_uri: ns_uri.to_owned(),
                local_name: attr.name().to_owned(),
                qualified_name,
                value: attr.value().to_owned(),
            });
        }
        Ok(attrs)
    }
}
