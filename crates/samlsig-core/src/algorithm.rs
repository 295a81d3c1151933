#![forbid(unsafe_code)]

//! Algorithm URI constants for XML signatures.
//!
//! Each constant is the URI that appears in an `Algorithm` attribute.

// ── Canonicalization ─────────────────────────────────────────────────

pub const C14N: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";
pub const C14N_WITH_COMMENTS: &str =
    "http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments";
pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
pub const EXC_C14N_WITH_COMMENTS: &str = "http://www.w3.org/2001/10/xml-exc-c14n#WithComments";

// ── Transforms ───────────────────────────────────────────────────────

pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

// ── Digest algorithms ────────────────────────────────────────────────

pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
pub const SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#sha384";
pub const SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";

// ── RSA signature algorithms ─────────────────────────────────────────

pub const RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
pub const RSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384";
pub const RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";

/// True if `uri` names one of the RSA PKCS#1 v1.5 signature methods.
pub fn is_rsa_signature(uri: &str) -> bool {
    matches!(uri, RSA_SHA1 | RSA_SHA256 | RSA_SHA384 | RSA_SHA512)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsa_family_detection() {
        assert!(is_rsa_signature(RSA_SHA256));
        assert!(is_rsa_signature(RSA_SHA1));
        assert!(!is_rsa_signature(SHA256));
        assert!(!is_rsa_signature("http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256"));
    }
}
