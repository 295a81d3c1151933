#![forbid(unsafe_code)]

//! Canonical XML 1.0 (inclusive) namespace handling.
//!
//! Every in-scope binding is declared on the apex; descendants only carry
//! bindings that differ from what an output ancestor already rendered.
//! `xml:*` attributes from ancestors outside the subtree are copied onto
//! the apex.

use crate::render::{Attr, NsDecl, RenderedNs};
use samlsig_core::ns;

pub(crate) fn namespace_decls(node: roxmltree::Node<'_, '_>, rendered: &RenderedNs) -> Vec<NsDecl> {
    let mut decls = Vec::new();
    let mut has_default = false;

    for namespace in node.namespaces() {
        let prefix = namespace.name().unwrap_or("");
        if prefix == "xml" || namespace.uri().is_empty() {
            continue;
        }
        if prefix.is_empty() {
            has_default = true;
        }
        if rendered.get(prefix).map(String::as_str) != Some(namespace.uri()) {
            decls.push(NsDecl::new(prefix, namespace.uri()));
        }
    }

    if !has_default && rendered.get("").map_or(false, |uri| !uri.is_empty()) {
        decls.push(NsDecl::new("", ""));
    }
    decls
}

/// Copy `xml:*` attributes in scope from ancestors onto the apex, nearest
/// ancestor winning, unless the apex sets the attribute itself.
pub(crate) fn inherit_xml_attributes(node: roxmltree::Node<'_, '_>, attrs: &mut Vec<Attr>) {
    for ancestor in node.ancestors().skip(1).filter(|n| n.is_element()) {
        for attr in ancestor.attributes() {
            if attr.namespace() != Some(ns::XML) {
                continue;
            }
            let present = attrs
                .iter()
                .any(|a| a.ns_uri == ns::XML && a.local_name == attr.name());
            if !present {
                attrs.push(Attr {
                    ns_uri: ns::XML.to_owned(),
                    local_name: attr.name().to_owned(),
                    qualified_name: format!("xml:{}", attr.name()),
                    value: attr.value().to_owned(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{canonicalize_subtree, C14nMode};

    #[test]
    fn xml_attributes_are_inherited_by_the_apex() {
        let xml = r#"<a xml:lang="sv"><b xml:space="preserve"><c/></b></a>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let c = doc.descendants().find(|n| n.has_tag_name("c")).unwrap();
        let out = canonicalize_subtree(&doc, c, C14nMode::Inclusive, None, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<c xml:lang="sv" xml:space="preserve"></c>"#
        );
    }

    #[test]
    fn exclusive_does_not_inherit_xml_attributes() {
        let xml = r#"<a xml:lang="sv"><c/></a>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let c = doc.descendants().find(|n| n.has_tag_name("c")).unwrap();
        let out = canonicalize_subtree(&doc, c, C14nMode::Exclusive, None, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<c></c>");
    }

    #[test]
    fn default_namespace_undeclared_in_descendant() {
        let xml = r#"<a xmlns="urn:d"><b xmlns=""/></a>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let out = canonicalize_subtree(&doc, doc.root_element(), C14nMode::Inclusive, None, &[])
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<a xmlns="urn:d"><b xmlns=""></b></a>"#
        );
    }
}
