#![forbid(unsafe_code)]

/// Errors produced by the samlsig SAML signature library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("invalid XML structure: {0}")]
    XmlStructure(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("cryptographic error: {0}")]
    Crypto(String),

    #[error("key error: {0}")]
    Key(String),

    /// A value of the wrong type was handed to a typed container.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// One validator entry could not verify the signature with the given key.
    #[error("signature verification failed: {0}")]
    VerificationFailure(String),

    /// No trust strategy in a validator chain was able to render a verdict.
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("no keys have been configured: {0}")]
    NoKeysConfigured(String),

    #[error("digest mismatch for reference: {0}")]
    DigestMismatch(String),

    #[error("canonicalization error: {0}")]
    Canonicalization(String),

    #[error("base64 decode error: {0}")]
    Base64(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing required element: {0}")]
    MissingElement(String),

    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("invalid URI reference: {0}")]
    InvalidUri(String),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for the chain-level failure that signals a deployment gap rather
    /// than a forged or unsigned message.
    pub fn is_missing_configuration(&self) -> bool {
        matches!(self, Error::MissingConfiguration(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
