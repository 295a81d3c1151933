#![forbid(unsafe_code)]

//! Key loading from PEM and DER.

use crate::key::{Key, KeyUsage};
use crate::x509::X509Certificate;
use samlsig_core::Error;

/// Load the public key of a PEM-encoded X.509 certificate.
///
/// The key is tagged with `algorithm` (a signature-method URI) and `usage`;
/// the certificate is kept on the key.
pub fn load_x509_cert_pem(pem_data: &[u8], algorithm: &str, usage: KeyUsage) -> Result<Key, Error> {
    let cert = X509Certificate::from_pem(pem_data)?;
    load_x509_cert(cert, algorithm, usage)
}

/// Load the public key of a DER-encoded X.509 certificate.
pub fn load_x509_cert_der(data: &[u8], algorithm: &str, usage: KeyUsage) -> Result<Key, Error> {
    load_x509_cert(X509Certificate::from_der(data.to_vec()), algorithm, usage)
}

/// Load the public key of an already decoded certificate.
pub fn load_x509_cert(cert: X509Certificate, algorithm: &str, usage: KeyUsage) -> Result<Key, Error> {
    let public = cert.rsa_public_key()?;
    Ok(Key::new(public, algorithm, usage).with_certificate(cert))
}

/// Load an RSA private key from PEM data (PKCS#8, then PKCS#1).
pub fn load_rsa_private_pem(pem_data: &[u8], algorithm: &str) -> Result<Key, Error> {
    use pkcs8::DecodePrivateKey;
    let pem_str = std::str::from_utf8(pem_data)
        .map_err(|e| Error::Key(format!("invalid PEM encoding: {e}")))?;

    // Try PKCS#8 first
    if let Ok(pk) = rsa::RsaPrivateKey::from_pkcs8_pem(pem_str) {
        return Ok(Key::from_private(pk, algorithm, KeyUsage::Any));
    }

    // Try PKCS#1
    use pkcs1::DecodeRsaPrivateKey;
    let pk = rsa::RsaPrivateKey::from_pkcs1_pem(pem_str)
        .map_err(|e| Error::Key(format!("failed to parse RSA private key PEM: {e}")))?;
    Ok(Key::from_private(pk, algorithm, KeyUsage::Any))
}

/// Load an RSA public key from PEM data (SPKI, then PKCS#1).
pub fn load_rsa_public_pem(pem_data: &[u8], algorithm: &str, usage: KeyUsage) -> Result<Key, Error> {
    use pkcs8::DecodePublicKey;
    let pem_str = std::str::from_utf8(pem_data)
        .map_err(|e| Error::Key(format!("invalid PEM encoding: {e}")))?;

    // Try SPKI first
    if let Ok(pk) = rsa::RsaPublicKey::from_public_key_pem(pem_str) {
        return Ok(Key::new(pk, algorithm, usage));
    }

    // Try PKCS#1
    use pkcs1::DecodeRsaPublicKey;
    let pk = rsa::RsaPublicKey::from_pkcs1_pem(pem_str)
        .map_err(|e| Error::Key(format!("failed to parse RSA public key PEM: {e}")))?;
    Ok(Key::new(pk, algorithm, usage))
}

/// Load a key from a file, picking the loader from the PEM label (or from
/// the extension for DER certificates).
pub fn load_key_file(path: &std::path::Path, algorithm: &str) -> Result<Key, Error> {
    let data = std::fs::read(path)?;

    if data.starts_with(b"-----BEGIN") {
        let text = std::str::from_utf8(&data)
            .map_err(|e| Error::Key(format!("invalid PEM encoding: {e}")))?;
        let label = pem_rfc7468::decode_label(text.trim().as_bytes())
            .map_err(|e| Error::Key(format!("failed to read PEM label: {e}")))?;
        return match label {
            "CERTIFICATE" => load_x509_cert_pem(&data, algorithm, KeyUsage::Any),
            "PRIVATE KEY" | "RSA PRIVATE KEY" => load_rsa_private_pem(&data, algorithm),
            "PUBLIC KEY" | "RSA PUBLIC KEY" => load_rsa_public_pem(&data, algorithm, KeyUsage::Any),
            other => Err(Error::Key(format!(
                "unsupported PEM label {other} in {}",
                path.display()
            ))),
        };
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext.eq_ignore_ascii_case("der") || ext.eq_ignore_ascii_case("cer") || ext.eq_ignore_ascii_case("crt") {
        return load_x509_cert_der(&data, algorithm, KeyUsage::Any);
    }

    Err(Error::Key(format!(
        "unable to auto-detect key format from file: {}",
        path.display()
    )))
}
