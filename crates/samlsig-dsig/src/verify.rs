#![forbid(unsafe_code)]

//! XML-DSig signature verification.
//!
//! Processing order:
//! 1. Find the single `ds:Signature` child of the element, register ID attributes
//! 2. Read `SignedInfo`: CanonicalizationMethod, SignatureMethod
//! 3. For each `Reference`: resolve URI, run transforms, compute digest, compare
//! 4. Require that one of the references covers the element itself
//! 5. Canonicalize `SignedInfo`, decode `SignatureValue`, collect certificates
//!
//! Steps 1-5 happen once in [`parse_signature`]; the `SignatureValue` check
//! against a particular key is [`verify_signature`].

use base64::Engine;
use samlsig_c14n::C14nMode;
use samlsig_core::{algorithm, ns, Error};
use samlsig_crypto::digest;
use samlsig_keys::Key;
use samlsig_xml::document::{build_id_map, compact_text, find_child_element, find_child_elements};
use std::collections::HashMap;

/// Everything needed to check a signature value against a candidate key.
#[derive(Debug, Clone)]
pub struct SignatureInfo {
    signature_method: String,
    canonical_signed_info: Vec<u8>,
    signature_value: Vec<u8>,
    certificates: Vec<String>,
}

impl SignatureInfo {
    /// The `SignatureMethod` algorithm URI.
    pub fn signature_method(&self) -> &str {
        &self.signature_method
    }

    /// `SignedInfo` in the canonical form named by its CanonicalizationMethod.
    pub fn canonical_signed_info(&self) -> &[u8] {
        &self.canonical_signed_info
    }

    pub fn signature_value(&self) -> &[u8] {
        &self.signature_value
    }

    /// Base64 certificate bodies found under `ds:KeyInfo`.
    pub fn certificates(&self) -> &[String] {
        &self.certificates
    }
}

/// Parse and reference-check the signature carried by `element`.
///
/// Returns `Ok(None)` when `element` has no `ds:Signature` child.  Every
/// structural problem, unsupported algorithm or digest mismatch is an error.
pub fn parse_signature(element: roxmltree::Node<'_, '_>) -> Result<Option<SignatureInfo>, Error> {
    let doc = element.document();

    let signatures = find_child_elements(element, ns::DSIG, ns::node::SIGNATURE);
    let sig_node = match signatures.as_slice() {
        [] => return Ok(None),
        [sig] => *sig,
        _ => {
            return Err(Error::XmlStructure(
                "more than one signature element in root".into(),
            ))
        }
    };

    let id_map = build_id_map(doc)?;

    // Find <SignedInfo>
    let signed_info = find_child_element(sig_node, ns::DSIG, ns::node::SIGNED_INFO)
        .ok_or_else(|| Error::MissingElement("SignedInfo".into()))?;

    // Read CanonicalizationMethod
    let c14n_method_node =
        find_child_element(signed_info, ns::DSIG, ns::node::CANONICALIZATION_METHOD)
            .ok_or_else(|| Error::MissingElement("CanonicalizationMethod".into()))?;
    let c14n_uri = c14n_method_node
        .attribute(ns::attr::ALGORITHM)
        .ok_or_else(|| Error::MissingAttribute("Algorithm on CanonicalizationMethod".into()))?;
    let c14n_mode = C14nMode::from_uri(c14n_uri)
        .ok_or_else(|| Error::UnsupportedAlgorithm(format!("C14N: {c14n_uri}")))?;
    let inclusive_prefixes = read_inclusive_prefixes(c14n_method_node);

    // Read SignatureMethod
    let sig_method_node = find_child_element(signed_info, ns::DSIG, ns::node::SIGNATURE_METHOD)
        .ok_or_else(|| Error::MissingElement("SignatureMethod".into()))?;
    let sig_method_uri = sig_method_node
        .attribute(ns::attr::ALGORITHM)
        .ok_or_else(|| Error::MissingAttribute("Algorithm on SignatureMethod".into()))?;
    if !algorithm::is_rsa_signature(sig_method_uri) {
        return Err(Error::UnsupportedAlgorithm(format!(
            "signature method: {sig_method_uri}"
        )));
    }

    // Verify each Reference
    let references = find_child_elements(signed_info, ns::DSIG, ns::node::REFERENCE);
    if references.is_empty() {
        return Err(Error::MissingElement("Reference".into()));
    }
    let mut covers_element = false;
    for reference in &references {
        let target = verify_reference(*reference, doc, &id_map, sig_node)?;
        covers_element |= target == element.id();
    }
    if !covers_element {
        return Err(Error::XmlStructure(
            "signature does not reference the signed element".into(),
        ));
    }

    // Canonicalize <SignedInfo>
    let canonical_signed_info = samlsig_c14n::canonicalize_subtree(
        doc,
        signed_info,
        c14n_mode,
        None,
        &inclusive_prefixes,
    )?;

    // Decode <SignatureValue>
    let sig_value_node = find_child_element(sig_node, ns::DSIG, ns::node::SIGNATURE_VALUE)
        .ok_or_else(|| Error::MissingElement("SignatureValue".into()))?;
    let signature_value = base64::engine::general_purpose::STANDARD
        .decode(compact_text(sig_value_node))
        .map_err(|e| Error::Base64(format!("SignatureValue: {e}")))?;

    let certificates = find_child_element(sig_node, ns::DSIG, ns::node::KEY_INFO)
        .map(samlsig_keys::keyinfo::extract_certificates)
        .unwrap_or_default();

    Ok(Some(SignatureInfo {
        signature_method: sig_method_uri.to_owned(),
        canonical_signed_info,
        signature_value,
        certificates,
    }))
}

/// Check the signature value with `key`.
///
/// An RSA key is used with whatever RSA method `SignedInfo` names, whatever
/// algorithm the key was tagged with when loaded.
pub fn verify_signature(info: &SignatureInfo, key: &Key) -> Result<(), Error> {
    let sig_alg = samlsig_crypto::sign::from_uri(&info.signature_method)?;
    match sig_alg.verify(
        &key.to_signing_key(),
        &info.canonical_signed_info,
        &info.signature_value,
    ) {
        Ok(true) => Ok(()),
        Ok(false) => Err(Error::VerificationFailure(
            "unable to validate signature with the given key".into(),
        )),
        Err(e) => Err(Error::VerificationFailure(e.to_string())),
    }
}

/// Verify a single `<Reference>` and return the node it covers.
fn verify_reference(
    reference: roxmltree::Node<'_, '_>,
    doc: &roxmltree::Document<'_>,
    id_map: &HashMap<String, roxmltree::NodeId>,
    sig_node: roxmltree::Node<'_, '_>,
) -> Result<roxmltree::NodeId, Error> {
    let uri = reference.attribute(ns::attr::URI).unwrap_or("");

    // Read DigestMethod
    let digest_method_node = find_child_element(reference, ns::DSIG, ns::node::DIGEST_METHOD)
        .ok_or_else(|| Error::MissingElement("DigestMethod".into()))?;
    let digest_uri = digest_method_node
        .attribute(ns::attr::ALGORITHM)
        .ok_or_else(|| Error::MissingAttribute("Algorithm on DigestMethod".into()))?;

    // Read expected DigestValue
    let digest_value_node = find_child_element(reference, ns::DSIG, ns::node::DIGEST_VALUE)
        .ok_or_else(|| Error::MissingElement("DigestValue".into()))?;
    let expected_digest = base64::engine::general_purpose::STANDARD
        .decode(compact_text(digest_value_node))
        .map_err(|e| Error::Base64(format!("DigestValue: {e}")))?;

    let target = resolve_reference_uri(uri, doc, id_map)?;

    // Read transforms; the output of a same-document reference is a node set
    // that is serialized with C14N 1.0 unless a transform says otherwise.
    let mut mode = C14nMode::Inclusive;
    let mut inclusive_prefixes = Vec::new();
    let mut exclude = None;
    if let Some(transforms) = find_child_element(reference, ns::DSIG, ns::node::TRANSFORMS) {
        for transform in find_child_elements(transforms, ns::DSIG, ns::node::TRANSFORM) {
            let transform_uri = transform.attribute(ns::attr::ALGORITHM).unwrap_or("");
            if transform_uri == algorithm::ENVELOPED_SIGNATURE {
                exclude = Some(sig_node.id());
            } else if let Some(c14n) = C14nMode::from_uri(transform_uri) {
                mode = c14n;
                inclusive_prefixes = read_inclusive_prefixes(transform);
            } else {
                return Err(Error::UnsupportedAlgorithm(format!(
                    "transform: {transform_uri}"
                )));
            }
        }
    }

    let bytes = samlsig_c14n::canonicalize_subtree(
        doc,
        target,
        mode,
        exclude,
        &inclusive_prefixes,
    )?;
    let computed = digest::digest(digest_uri, &bytes)?;

    if computed != expected_digest {
        tracing::debug!(uri, "reference digest mismatch");
        return Err(Error::DigestMismatch(format!("URI={uri}")));
    }
    Ok(target.id())
}

/// Resolve a same-document reference: `""` is the document element,
/// `#id` the element carrying that ID.
fn resolve_reference_uri<'a, 'input>(
    uri: &str,
    doc: &'a roxmltree::Document<'input>,
    id_map: &HashMap<String, roxmltree::NodeId>,
) -> Result<roxmltree::Node<'a, 'input>, Error> {
    if uri.is_empty() {
        return Ok(doc.root_element());
    }
    let id = uri
        .strip_prefix('#')
        .ok_or_else(|| Error::InvalidUri(format!("external URI not supported: {uri}")))?;
    let node_id = id_map
        .get(id)
        .ok_or_else(|| Error::InvalidUri(format!("no element with ID {id}")))?;
    doc.get_node(*node_id)
        .ok_or_else(|| Error::InvalidUri(format!("no element with ID {id}")))
}

fn read_inclusive_prefixes(node: roxmltree::Node<'_, '_>) -> Vec<String> {
    // Look for <InclusiveNamespaces PrefixList="..."> child
    find_child_element(node, ns::EXC_C14N, ns::node::INCLUSIVE_NAMESPACES)
        .and_then(|child| child.attribute(ns::attr::PREFIX_LIST))
        .map(|list| list.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}
