#![forbid(unsafe_code)]

//! Key types and data structures.

use crate::x509::X509Certificate;
use samlsig_crypto::sign::SigningKey;

/// What a key may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyUsage {
    Signing,
    Encryption,
    Any,
}

impl KeyUsage {
    /// Usage derived from a pair of configuration flags.
    pub fn from_flags(signing: bool, encryption: bool) -> Self {
        match (signing, encryption) {
            (true, false) => Self::Signing,
            (false, true) => Self::Encryption,
            _ => Self::Any,
        }
    }
}

/// An RSA key handle with its algorithm tag.
///
/// Built once by the loaders and never mutated afterwards; the `with_*`
/// builders consume and return the value.
#[derive(Clone)]
pub struct Key {
    name: Option<String>,
    algorithm: String,
    usage: KeyUsage,
    public: rsa::RsaPublicKey,
    private: Option<rsa::RsaPrivateKey>,
    certificate: Option<X509Certificate>,
}

impl Key {
    /// Create a public key tagged with a signature-method URI.
    pub fn new(public: rsa::RsaPublicKey, algorithm: impl Into<String>, usage: KeyUsage) -> Self {
        Self {
            name: None,
            algorithm: algorithm.into(),
            usage,
            public,
            private: None,
            certificate: None,
        }
    }

    /// Create a key from an RSA private key; the public half is derived.
    pub fn from_private(
        private: rsa::RsaPrivateKey,
        algorithm: impl Into<String>,
        usage: KeyUsage,
    ) -> Self {
        let mut key = Self::new(private.to_public_key(), algorithm, usage);
        key.private = Some(private);
        key
    }

    /// Set the key name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach the certificate this key was taken from.
    pub fn with_certificate(mut self, certificate: X509Certificate) -> Self {
        self.certificate = Some(certificate);
        self
    }

    /// A copy of this key re-tagged for another signature method.
    pub fn with_algorithm(&self, algorithm: impl Into<String>) -> Self {
        let mut key = self.clone();
        key.algorithm = algorithm.into();
        key
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The signature-method URI this key is meant for.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn usage(&self) -> KeyUsage {
        self.usage
    }

    /// True if the key may serve the requested usage.
    pub fn can_be_used_for(&self, usage: KeyUsage) -> bool {
        self.usage == KeyUsage::Any || usage == KeyUsage::Any || self.usage == usage
    }

    pub fn public_key(&self) -> &rsa::RsaPublicKey {
        &self.public
    }

    pub fn private_key(&self) -> Option<&rsa::RsaPrivateKey> {
        self.private.as_ref()
    }

    pub fn is_private(&self) -> bool {
        self.private.is_some()
    }

    /// The certificate the key was loaded from, if any.
    pub fn certificate(&self) -> Option<&X509Certificate> {
        self.certificate.as_ref()
    }

    /// Convert to a `SigningKey` for use with crypto algorithms.
    pub fn to_signing_key(&self) -> SigningKey {
        match &self.private {
            Some(pk) => SigningKey::Rsa(pk.clone()),
            None => SigningKey::RsaPublic(self.public.clone()),
        }
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.name)
            .field("algorithm", &self.algorithm)
            .field("usage", &self.usage)
            .field("private", &self.private.is_some())
            .field(
                "certificate",
                &self.certificate.as_ref().map(|c| c.fingerprint()),
            )
            .finish()
    }
}
