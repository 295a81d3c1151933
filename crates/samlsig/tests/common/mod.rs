#![allow(dead_code)]

use samlsig::core::algorithm;
use samlsig::keys::{loader, X509Certificate};
use samlsig::{Key, KeyUsage};
use std::path::PathBuf;

/// The response signed by the rollover key, with the idp and rollover
/// certificates in that order in its KeyInfo.
pub const ROLLOVER_RESPONSE: &str = "saml/response-signed-rollover.xml";

pub const UNSIGNED_RESPONSE: &str = concat!(
    r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_r1" Version="2.0">"#,
    r#"<saml:Issuer xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion">https://idp.example.org</saml:Issuer>"#,
    r#"<samlp:Status><samlp:StatusCode Value="urn:oasis:names:tc:SAML:2.0:status:Success"/></samlp:Status>"#,
    r#"</samlp:Response>"#,
);

pub fn test_data(relative: &str) -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../test-data")).join(relative)
}

pub fn read_test_data(relative: &str) -> String {
    std::fs::read_to_string(test_data(relative)).unwrap()
}

pub fn certificate(name: &str) -> X509Certificate {
    X509Certificate::first_in_text(&read_test_data(&format!("keys/{name}.crt.pem"))).unwrap()
}

/// Base64 certificate body as it appears in KeyInfo and configuration.
pub fn certificate_body(name: &str) -> String {
    certificate(name).base64().to_owned()
}

pub fn public_key(name: &str) -> Key {
    loader::load_x509_cert(certificate(name), algorithm::RSA_SHA256, KeyUsage::Signing).unwrap()
}

pub fn private_key(name: &str) -> Key {
    let pem = read_test_data(&format!("keys/{name}.key.pem"));
    loader::load_rsa_private_pem(pem.as_bytes(), algorithm::RSA_SHA256).unwrap()
}
