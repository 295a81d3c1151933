#![forbid(unsafe_code)]

//! Element lookups, ID resolution and source-text splicing over roxmltree.

use samlsig_core::{ns, Error};
use std::collections::HashMap;

/// Build the ID → NodeId mapping for a parsed document.
///
/// An ID value that appears on two elements makes every `#id` reference
/// ambiguous, so it is rejected instead of letting the last one win.
pub fn build_id_map(
    doc: &roxmltree::Document<'_>,
) -> Result<HashMap<String, roxmltree::NodeId>, Error> {
    let mut map = HashMap::new();
    for node in doc.descendants().filter(|n| n.is_element()) {
        for attr_name in ns::attr::ID_ATTRS {
            if let Some(val) = node.attribute(attr_name) {
                match map.insert(val.to_owned(), node.id()) {
                    Some(prev) if prev != node.id() => {
                        return Err(Error::XmlStructure(format!("duplicate ID value: {val}")));
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(map)
}

/// Return the ID of an element, checking the same attribute names as
/// [`build_id_map`].
pub fn element_id<'a>(node: roxmltree::Node<'a, '_>) -> Option<&'a str> {
    ns::attr::ID_ATTRS
        .iter()
        .find_map(|name| node.attribute(*name))
}

/// True if `node` is an element with the given namespace and local name.
pub fn is_element(node: roxmltree::Node<'_, '_>, ns_uri: &str, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace().unwrap_or("") == ns_uri
}

/// Find the first child element with the given local name and namespace.
pub fn find_child_element<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns_uri: &str,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    parent.children().find(|n| is_element(*n, ns_uri, local_name))
}

/// Find all child elements with the given local name and namespace.
pub fn find_child_elements<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns_uri: &str,
    local_name: &str,
) -> Vec<roxmltree::Node<'a, 'input>> {
    parent
        .children()
        .filter(|n| is_element(*n, ns_uri, local_name))
        .collect()
}

/// Whitespace-free text content of an element (base64 payloads are often
/// wrapped over several lines).
pub fn compact_text(node: roxmltree::Node<'_, '_>) -> String {
    node.text()
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// The element's qualified name exactly as written in the source
/// (`samlp:Response`, `Issuer`, ...).
///
/// roxmltree resolves prefixes away, but canonical output must reproduce
/// them, so the name is read back from the start tag.
pub fn qualified_name<'input>(
    doc: &roxmltree::Document<'input>,
    node: roxmltree::Node<'_, 'input>,
) -> &'input str {
    let tag = &doc.input_text()[node.range()];
    let tag = tag.strip_prefix('<').unwrap_or(tag);
    let end = tag
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(tag.len());
    &tag[..end]
}

/// The prefix part of an element's qualified name ("" when unprefixed).
pub fn element_prefix<'input>(
    doc: &roxmltree::Document<'input>,
    node: roxmltree::Node<'_, 'input>,
) -> &'input str {
    let qname = qualified_name(doc, node);
    match qname.split_once(':') {
        Some((prefix, _)) => prefix,
        None => "",
    }
}

/// The attribute's qualified name exactly as written in the source.
///
/// Several prefixes may be bound to the same URI; only the source says
/// which one the attribute used.
pub fn attribute_qualified_name<'input>(
    doc: &roxmltree::Document<'input>,
    attr: &roxmltree::Attribute<'_, 'input>,
) -> &'input str {
    &doc.input_text()[attr.range_qname()]
}

/// The prefix part of an attribute's qualified name ("" when unprefixed).
pub fn attribute_prefix<'input>(
    doc: &roxmltree::Document<'input>,
    attr: &roxmltree::Attribute<'_, 'input>,
) -> &'input str {
    attribute_qualified_name(doc, attr)
        .split_once(':')
        .map_or("", |(prefix, _)| prefix)
}

/// Insert `fragment` into the source text immediately before `node`.
pub fn insert_before(
    doc: &roxmltree::Document<'_>,
    node: roxmltree::Node<'_, '_>,
    fragment: &str,
) -> String {
    let text = doc.input_text();
    let pos = node.range().start;
    let mut out = String::with_capacity(text.len() + fragment.len());
    out.push_str(&text[..pos]);
    out.push_str(fragment);
    out.push_str(&text[pos..]);
    out
}

/// Insert `fragment` as the last child of `element`.
///
/// A self-closing element (`<x/>`) is expanded into a start/end tag pair.
pub fn append_child(
    doc: &roxmltree::Document<'_>,
    element: roxmltree::Node<'_, '_>,
    fragment: &str,
) -> Result<String, Error> {
    let text = doc.input_text();
    let range = element.range();
    let source = &text[range.clone()];
    let mut out = String::with_capacity(text.len() + fragment.len() + 16);

    if element.has_children() {
        let close = source
            .rfind("</")
            .ok_or_else(|| Error::XmlStructure("element has no end tag".into()))?;
        let pos = range.start + close;
        out.push_str(&text[..pos]);
        out.push_str(fragment);
        out.push_str(&text[pos..]);
    } else {
        let qname = qualified_name(doc, element);
        let trimmed = source.trim_end();
        if let Some(head) = trimmed.strip_suffix("/>") {
            out.push_str(&text[..range.start]);
            out.push_str(head.trim_end());
            out.push('>');
            out.push_str(fragment);
            out.push_str("</");
            out.push_str(qname);
            out.push('>');
            out.push_str(&text[range.end..]);
        } else {
            // `<x></x>`: insert right before the end tag.
            let close = source
                .rfind("</")
                .ok_or_else(|| Error::XmlStructure("element has no end tag".into()))?;
            let pos = range.start + close;
            out.push_str(&text[..pos]);
            out.push_str(fragment);
            out.push_str(&text[pos..]);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_r1"><saml:Issuer xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion">idp</saml:Issuer><samlp:Status/></samlp:Response>"#;

    #[test]
    fn qualified_names_keep_their_prefix() {
        let doc = roxmltree::Document::parse(RESPONSE).unwrap();
        let root = doc.root_element();
        assert_eq!(qualified_name(&doc, root), "samlp:Response");
        assert_eq!(element_prefix(&doc, root), "samlp");
        let issuer = find_child_element(root, ns::SAML_ASSERTION, "Issuer").unwrap();
        assert_eq!(qualified_name(&doc, issuer), "saml:Issuer");
    }

    #[test]
    fn attribute_prefix_comes_from_the_source() {
        let xml = r#"<r xmlns:a="urn:x" xmlns:b="urn:x" b:attr="v" plain="w"/>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let attrs: Vec<_> = doc.root_element().attributes().collect();
        assert_eq!(attribute_qualified_name(&doc, &attrs[0]), "b:attr");
        assert_eq!(attribute_prefix(&doc, &attrs[0]), "b");
        assert_eq!(attribute_prefix(&doc, &attrs[1]), "");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let xml = r#"<a ID="x"><b ID="x"/></a>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        assert!(matches!(build_id_map(&doc), Err(Error::XmlStructure(_))));
    }

    #[test]
    fn id_map_resolves_unique_ids() {
        let doc = roxmltree::Document::parse(RESPONSE).unwrap();
        let map = build_id_map(&doc).unwrap();
        assert_eq!(map.get("_r1"), Some(&doc.root_element().id()));
        assert_eq!(element_id(doc.root_element()), Some("_r1"));
    }

    #[test]
    fn insert_before_sibling() {
        let doc = roxmltree::Document::parse(RESPONSE).unwrap();
        let status = find_child_element(doc.root_element(), ns::SAML_PROTOCOL, "Status").unwrap();
        let out = insert_before(&doc, status, "<X/>");
        assert!(out.contains("</saml:Issuer><X/><samlp:Status/>"));
    }

    #[test]
    fn append_to_self_closing_element() {
        let doc = roxmltree::Document::parse(r#"<a:root xmlns:a="urn:a" x="1"/>"#).unwrap();
        let out = append_child(&doc, doc.root_element(), "<b/>").unwrap();
        assert_eq!(out, r#"<a:root xmlns:a="urn:a" x="1"><b/></a:root>"#);
    }

    #[test]
    fn append_after_last_child() {
        let doc = roxmltree::Document::parse(RESPONSE).unwrap();
        let out = append_child(&doc, doc.root_element(), "<X/>").unwrap();
        assert!(out.ends_with("<samlp:Status/><X/></samlp:Response>"));
    }

    #[test]
    fn doctype_is_refused() {
        let xml = "<!DOCTYPE a [<!ENTITY e \"x\">]><a>&e;</a>";
        assert!(roxmltree::Document::parse_with_options(xml, crate::parsing_options()).is_err());
    }
}
