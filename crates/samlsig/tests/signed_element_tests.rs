mod common;

use common::*;
use samlsig::{ChildRef, Error, SignedElement};

#[test]
fn unsigned_element() {
    let element = SignedElement::from_xml(UNSIGNED_RESPONSE).unwrap();
    assert!(!element.is_signed());
    assert_eq!(element.validator_count(), 0);
    assert!(element.candidate_certificates().is_empty());
    assert!(!element.validate(&public_key("idp")).unwrap());
    assert!(element.validating_certificates().is_empty());
}

#[test]
fn not_well_formed_document_is_an_error() {
    assert!(matches!(
        SignedElement::from_xml("<samlp:Response"),
        Err(Error::XmlParse(_))
    ));
}

#[test]
fn only_the_signing_certificate_validates() {
    let element = SignedElement::from_xml(&read_test_data(ROLLOVER_RESPONSE)).unwrap();
    assert!(element.is_signed());
    assert_eq!(element.validator_count(), 1);
    assert_eq!(
        element.candidate_certificates(),
        [certificate_body("idp"), certificate_body("idp-rollover")]
    );

    assert_eq!(
        element.validating_certificates(),
        [element.candidate_certificates()[1].clone()]
    );

    assert!(element.validate(&public_key("idp-rollover")).unwrap());
    assert!(matches!(
        element.validate(&public_key("idp")),
        Err(Error::VerificationFailure(_))
    ));
}

#[test]
fn signature_of_the_parent_does_not_sign_children() {
    let xml = read_test_data(ROLLOVER_RESPONSE);
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let assertion = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("Assertion"))
        .unwrap();
    let element = SignedElement::from_node(assertion);
    assert!(!element.is_signed());
    assert!(!element.validate(&public_key("idp-rollover")).unwrap());
}

#[test]
fn tampered_document_is_treated_as_unsigned() {
    let xml = read_test_data(ROLLOVER_RESPONSE).replace("Tom &amp; Jerry", "Tom &amp; Spike");
    let element = SignedElement::from_xml(&xml).unwrap();
    assert!(!element.is_signed());
    assert!(element.candidate_certificates().is_empty());
    assert!(!element.validate(&public_key("idp-rollover")).unwrap());
}

#[test]
fn malformed_signature_value_is_treated_as_unsigned() {
    let xml = read_test_data(ROLLOVER_RESPONSE);
    let start = xml.find("<ds:SignatureValue>").unwrap() + "<ds:SignatureValue>".len();
    let end = xml.find("</ds:SignatureValue>").unwrap();
    let broken = format!("{}!!not base64!!{}", &xml[..start], &xml[end..]);

    let element = SignedElement::from_xml(&broken).unwrap();
    assert!(!element.is_signed());
    assert!(element.validating_certificates().is_empty());
}

#[test]
fn garbage_candidate_certificate_is_skipped() {
    let xml = read_test_data(ROLLOVER_RESPONSE);
    let idp = certificate_body("idp");
    let start = xml.find(&idp).unwrap();
    // Damage the idp certificate's DER while keeping valid base64.
    let broken = format!("{}AAAA{}", &xml[..start], &xml[start + 4..]);

    let element = SignedElement::from_xml(&broken).unwrap();
    assert_eq!(element.candidate_certificates().len(), 2);
    assert_eq!(
        element.validating_certificates(),
        [certificate_body("idp-rollover")]
    );
}

#[test]
fn sign_then_validate() {
    let mut signer = SignedElement::new();
    signer.set_signature_key(Some(private_key("idp")));
    signer.set_signing_certificates(vec![certificate_body("unrelated"), certificate_body("idp")]);

    let status = ChildRef::new("urn:oasis:names:tc:SAML:2.0:protocol", "Status");
    let signed = signer.sign(UNSIGNED_RESPONSE, Some(&status)).unwrap().unwrap();
    assert!(signed.contains("</saml:Issuer><ds:Signature"));

    let element = SignedElement::from_xml(&signed).unwrap();
    assert_eq!(
        element.candidate_certificates(),
        [certificate_body("unrelated"), certificate_body("idp")]
    );
    assert_eq!(element.validating_certificates(), [certificate_body("idp")]);
    assert!(element.validate(&public_key("idp")).unwrap());
    assert!(element.validate(&public_key("unrelated")).is_err());
}

#[test]
fn validating_certificates_are_stable() {
    let element = SignedElement::from_xml(&read_test_data(ROLLOVER_RESPONSE)).unwrap();
    let first = element.validating_certificates();
    assert_eq!(first, [certificate_body("idp-rollover")]);
    assert_eq!(element.validating_certificates(), first);

    let mut signer = SignedElement::new();
    signer.set_signature_key(Some(private_key("idp")));
    signer.set_signing_certificates(vec![certificate_body("unrelated"), certificate_body("idp")]);
    let signed = signer.sign(UNSIGNED_RESPONSE, None).unwrap().unwrap();

    let element = SignedElement::from_xml(&signed).unwrap();
    let first = element.validating_certificates();
    assert_eq!(first, [certificate_body("idp")]);
    assert_eq!(element.validating_certificates(), first);
    assert_eq!(
        element.candidate_certificates(),
        [certificate_body("unrelated"), certificate_body("idp")]
    );
}

#[test]
fn signing_is_deterministic() {
    let mut signer = SignedElement::new();
    signer.set_signature_key(Some(private_key("idp-rollover")));
    let first = signer.sign(UNSIGNED_RESPONSE, None).unwrap().unwrap();
    let second = signer.sign(UNSIGNED_RESPONSE, None).unwrap().unwrap();
    assert_eq!(first, second);
}

#[test]
fn signing_does_not_change_validation_state() {
    let mut element = SignedElement::from_xml(UNSIGNED_RESPONSE).unwrap();
    element.set_signature_key(Some(private_key("idp")));
    assert!(element.sign(UNSIGNED_RESPONSE, None).unwrap().is_some());
    assert!(!element.is_signed());
    assert!(!element.validate(&public_key("idp")).unwrap());
}

#[test]
fn signing_requires_the_insertion_point() {
    let mut signer = SignedElement::new();
    signer.set_signature_key(Some(private_key("idp")));
    assert!(matches!(
        signer.sign(UNSIGNED_RESPONSE, Some(&ChildRef::local("Extensions"))),
        Err(Error::MissingElement(_))
    ));
}

#[test]
fn custom_validator_entries() {
    let mut element = SignedElement::from_xml(&read_test_data(ROLLOVER_RESPONSE)).unwrap();
    element.add_validator(|key: &samlsig::Key| {
        if key.name() == Some("trusted") {
            Ok(())
        } else {
            Err(Error::VerificationFailure("untrusted".into()))
        }
    });
    assert_eq!(element.validator_count(), 2);

    // The embedded signature still wins for its own key.
    assert!(element.validate(&public_key("idp-rollover")).unwrap());
    // The second entry accepts a key the signature does not.
    assert!(element.validate(&public_key("idp").with_name("trusted")).unwrap());
    // Otherwise the first entry's error is reported.
    assert!(matches!(
        element.validate(&public_key("idp")),
        Err(Error::VerificationFailure(message)) if message != "untrusted"
    ));
}
