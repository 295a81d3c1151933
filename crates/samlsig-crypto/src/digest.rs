#![forbid(unsafe_code)]

//! Reference digest methods.

use digest::Digest;
use samlsig_core::{algorithm, Error};

/// A `ds:DigestMethod` this library can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestMethod {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestMethod {
    /// Look up a digest method by its algorithm URI.
    pub fn from_uri(uri: &str) -> Result<Self, Error> {
        match uri {
            algorithm::SHA1 => Ok(Self::Sha1),
            algorithm::SHA256 => Ok(Self::Sha256),
            algorithm::SHA384 => Ok(Self::Sha384),
            algorithm::SHA512 => Ok(Self::Sha512),
            _ => Err(Error::UnsupportedAlgorithm(format!("digest method: {uri}"))),
        }
    }

    pub fn uri(self) -> &'static str {
        match self {
            Self::Sha1 => algorithm::SHA1,
            Self::Sha256 => algorithm::SHA256,
            Self::Sha384 => algorithm::SHA384,
            Self::Sha512 => algorithm::SHA512,
        }
    }

    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => sha1::Sha1::digest(data).to_vec(),
            Self::Sha256 => sha2::Sha256::digest(data).to_vec(),
            Self::Sha384 => sha2::Sha384::digest(data).to_vec(),
            Self::Sha512 => sha2::Sha512::digest(data).to_vec(),
        }
    }
}

/// Digest `data` with the method named by `uri`.
pub fn digest(uri: &str, data: &[u8]) -> Result<Vec<u8>, Error> {
    Ok(DigestMethod::from_uri(uri)?.digest(data))
}

/// SHA-1 over raw bytes, used for certificate fingerprints.
pub fn sha1(data: &[u8]) -> Vec<u8> {
    DigestMethod::Sha1.digest(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_hello() {
        let result = digest(algorithm::SHA256, b"hello").unwrap();
        assert_eq!(
            hex::encode(result),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn sha1_matches_fingerprint_helper() {
        let result = digest(algorithm::SHA1, b"hello").unwrap();
        assert_eq!(result, sha1(b"hello"));
        assert_eq!(hex::encode(result), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    }

    #[test]
    fn output_lengths() {
        assert_eq!(digest(algorithm::SHA384, b"x").unwrap().len(), 48);
        assert_eq!(digest(algorithm::SHA512, b"x").unwrap().len(), 64);
    }

    #[test]
    fn uri_round_trip() {
        for method in [DigestMethod::Sha1, DigestMethod::Sha256, DigestMethod::Sha384, DigestMethod::Sha512] {
            assert_eq!(DigestMethod::from_uri(method.uri()).unwrap(), method);
        }
    }

    #[test]
    fn md5_is_unsupported() {
        assert!(matches!(
            DigestMethod::from_uri("http://www.w3.org/2001/04/xmldsig-more#md5"),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }
}
