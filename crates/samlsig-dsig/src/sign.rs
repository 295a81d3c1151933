#![forbid(unsafe_code)]

//! XML-DSig signature creation.
//!
//! Signs the document element with an enveloped signature: exclusive C14N,
//! SHA-256 reference digest, the key's own signature method.  The signature
//! is built as a template with an empty `SignatureValue`, spliced into the
//! document, and the value is filled in once `SignedInfo` has been
//! canonicalized in its final position.

use base64::Engine;
use samlsig_c14n::C14nMode;
use samlsig_core::{algorithm, ns, Error};
use samlsig_crypto::digest;
use samlsig_keys::Key;
use samlsig_xml::document::{
    append_child, element_id, find_child_element, find_child_elements,
};

/// Names the child element a new signature is inserted in front of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef {
    namespace: Option<String>,
    local_name: String,
}

impl ChildRef {
    /// Match a child by namespace URI and local name.
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Match a child by local name in any namespace.
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    fn matches(&self, node: roxmltree::Node<'_, '_>) -> bool {
        node.is_element()
            && node.tag_name().name() == self.local_name
            && self
                .namespace
                .as_deref()
                .map_or(true, |uri| node.tag_name().namespace().unwrap_or("") == uri)
    }
}

impl std::fmt::Display for ChildRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(uri) => write!(f, "{{{uri}}}{}", self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// Sign the document element of `xml` with `key`.
///
/// `certificates` (base64 bodies) are embedded under `ds:KeyInfo`.  The
/// signature is inserted before the first child matching `insert_before`,
/// or appended as the last child when `insert_before` is `None`.
///
/// Returns the signed document text.
pub fn insert_signature(
    key: &Key,
    certificates: &[String],
    xml: &str,
    insert_before: Option<&ChildRef>,
) -> Result<String, Error> {
    if !key.is_private() {
        return Err(Error::Key("RSA private key required for signing".into()));
    }
    let sig_alg = samlsig_crypto::sign::from_uri(key.algorithm())?;

    let doc = roxmltree::Document::parse_with_options(xml, samlsig_xml::parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))?;
    let root = doc.root_element();
    if find_child_element(root, ns::DSIG, ns::node::SIGNATURE).is_some() {
        return Err(Error::XmlStructure("element is already signed".into()));
    }

    let reference_uri = match element_id(root) {
        Some(id) => format!("#{id}"),
        None => String::new(),
    };

    // The enveloped transform removes the signature again, so the digest
    // can be taken before the signature exists.
    let canonical_root = samlsig_c14n::canonicalize_subtree(&doc, root, C14nMode::Exclusive, None, &[])?;
    let digest_value = base64::engine::general_purpose::STANDARD
        .encode(digest::digest(algorithm::SHA256, &canonical_root)?);

    let template = signature_template(key.algorithm(), &reference_uri, &digest_value, certificates);
    let with_template = match insert_before {
        Some(child) => {
            let sibling = root
                .children()
                .find(|n| child.matches(*n))
                .ok_or_else(|| Error::MissingElement(format!("insertion point {child}")))?;
            samlsig_xml::document::insert_before(&doc, sibling, &template)
        }
        None => append_child(&doc, root, &template)?,
    };

    // Canonicalize SignedInfo where it now lives and fill in the value.
    let doc = roxmltree::Document::parse_with_options(&with_template, samlsig_xml::parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))?;
    let sig_node = find_child_elements(doc.root_element(), ns::DSIG, ns::node::SIGNATURE)
        .into_iter()
        .next()
        .ok_or_else(|| Error::MissingElement("Signature".into()))?;
    let signed_info = find_child_element(sig_node, ns::DSIG, ns::node::SIGNED_INFO)
        .ok_or_else(|| Error::MissingElement("SignedInfo".into()))?;
    let sig_value_node = find_child_element(sig_node, ns::DSIG, ns::node::SIGNATURE_VALUE)
        .ok_or_else(|| Error::MissingElement("SignatureValue".into()))?;

    let canonical_signed_info =
        samlsig_c14n::canonicalize_subtree(&doc, signed_info, C14nMode::Exclusive, None, &[])?;
    let signature = sig_alg.sign(&key.to_signing_key(), &canonical_signed_info)?;
    let signature_b64 = base64::engine::general_purpose::STANDARD.encode(signature);

    tracing::debug!(
        uri = %reference_uri,
        method = key.algorithm(),
        certificates = certificates.len(),
        "signed element"
    );

    let range = sig_value_node.range();
    let p = ns::DSIG_PREFIX;
    let sv = ns::node::SIGNATURE_VALUE;
    Ok(format!(
        "{}<{p}:{sv}>{signature_b64}</{p}:{sv}>{}",
        &with_template[..range.start],
        &with_template[range.end..],
    ))
}

fn signature_template(
    signature_method: &str,
    reference_uri: &str,
    digest_value: &str,
    certificates: &[String],
) -> String {
    let p = ns::DSIG_PREFIX;
    let key_info = samlsig_keys::keyinfo::write_key_info(certificates);
    format!(
        concat!(
            r#"<{p}:Signature xmlns:{p}="{dsig}">"#,
            "<{p}:SignedInfo>",
            r#"<{p}:CanonicalizationMethod Algorithm="{exc}"/>"#,
            r#"<{p}:SignatureMethod Algorithm="{method}"/>"#,
            r#"<{p}:Reference URI="{uri}">"#,
            "<{p}:Transforms>",
            r#"<{p}:Transform Algorithm="{enveloped}"/>"#,
            r#"<{p}:Transform Algorithm="{exc}"/>"#,
            "</{p}:Transforms>",
            r#"<{p}:DigestMethod Algorithm="{sha256}"/>"#,
            "<{p}:DigestValue>{digest}</{p}:DigestValue>",
            "</{p}:Reference>",
            "</{p}:SignedInfo>",
            "<{p}:SignatureValue></{p}:SignatureValue>",
            "{key_info}",
            "</{p}:Signature>",
        ),
        p = p,
        dsig = ns::DSIG,
        exc = algorithm::EXC_C14N,
        method = escape_attr(signature_method),
        uri = escape_attr(reference_uri),
        enveloped = algorithm::ENVELOPED_SIGNATURE,
        sha256 = algorithm::SHA256,
        digest = digest_value,
        key_info = key_info,
    )
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}
