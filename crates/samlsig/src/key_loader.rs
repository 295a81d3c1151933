#![forbid(unsafe_code)]

//! Turns identity-provider configuration into verification keys.
//!
//! Sources are consulted in a fixed order and only the first one present is
//! used: the explicit `keys` list, then `certificate_data`, then
//! `certificate_file`.

use crate::configuration::{CertificateProvider, KeyConfig, X509_CERTIFICATE_KEY_TYPE};
use samlsig_core::{algorithm, Error};
use samlsig_keys::{loader, Key, KeyCollection, KeyUsage, X509Certificate};
use std::path::Path;

/// Accumulates the keys loaded from one configuration.
#[derive(Debug, Default)]
pub struct KeyLoader {
    keys: KeyCollection,
}

impl KeyLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the public keys `configuration` offers for `usage`.
    ///
    /// # Errors
    ///
    /// [`Error::NoKeysConfigured`] when `required` and nothing was loaded;
    /// otherwise whatever loading `certificate_data` or `certificate_file`
    /// failed with.
    pub fn extract_public_keys(
        configuration: &dyn CertificateProvider,
        usage: KeyUsage,
        required: bool,
    ) -> Result<KeyCollection, Error> {
        let mut loader = Self::new();
        loader.load_keys_from_configuration(configuration, usage, required)?;
        Ok(loader.into_keys())
    }

    /// Load keys from the first configured source.
    ///
    /// # Errors
    ///
    /// See [`KeyLoader::extract_public_keys`].
    pub fn load_keys_from_configuration(
        &mut self,
        configuration: &dyn CertificateProvider,
        usage: KeyUsage,
        required: bool,
    ) -> Result<(), Error> {
        if let Some(keys) = configuration.keys() {
            self.load_keys(keys, usage);
        } else if let Some(data) = configuration.certificate_data() {
            self.load_certificate_data(data)?;
        } else if let Some(path) = configuration.certificate_file() {
            self.load_certificate_file(path)?;
        }

        if required && !self.has_keys() {
            return Err(Error::NoKeysConfigured(format!(
                "no {usage:?} keys in identity provider configuration"
            )));
        }
        Ok(())
    }

    /// Load the X.509 entries of `keys` that are flagged for `usage`.
    ///
    /// Entries of another type are skipped, as is an entry whose certificate
    /// does not load.
    pub fn load_keys(&mut self, keys: &[KeyConfig], usage: KeyUsage) {
        for (index, config) in keys.iter().enumerate() {
            if config.key_type != X509_CERTIFICATE_KEY_TYPE {
                tracing::debug!(index, key_type = %config.key_type, "skipping unsupported key type");
                continue;
            }
            if !flagged_for(config, usage) {
                continue;
            }
            let key_usage = KeyUsage::from_flags(config.signing, config.encryption);
            match certificate_key(&config.x509_certificate, key_usage) {
                Ok(key) => self.keys.push(key.with_name(format!("keys[{index}]"))),
                Err(e) => tracing::warn!(index, error = %e, "skipping unreadable configured key"),
            }
        }
    }

    /// Load a single certificate given inline, as a base64 body or PEM.
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate cannot be decoded.
    pub fn load_certificate_data(&mut self, data: &str) -> Result<(), Error> {
        let key = certificate_key(data, KeyUsage::Any)?;
        self.keys.push(key.with_name("certificate_data"));
        Ok(())
    }

    /// Load the first PEM certificate in the file at `path`.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be read, [`Error::Certificate`] if it
    /// holds no certificate.
    pub fn load_certificate_file(&mut self, path: &Path) -> Result<(), Error> {
        let text = std::fs::read_to_string(path)?;
        let cert = X509Certificate::first_in_text(&text)?;
        let key = loader::load_x509_cert(cert, algorithm::RSA_SHA256, KeyUsage::Any)?;
        self.keys.push(key.with_name(path.display().to_string()));
        Ok(())
    }

    pub fn keys(&self) -> &KeyCollection {
        &self.keys
    }

    pub fn has_keys(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn into_keys(self) -> KeyCollection {
        self.keys
    }
}

fn flagged_for(config: &KeyConfig, usage: KeyUsage) -> bool {
    match usage {
        KeyUsage::Signing => config.signing,
        KeyUsage::Encryption => config.encryption,
        KeyUsage::Any => true,
    }
}

fn certificate_key(data: &str, usage: KeyUsage) -> Result<Key, Error> {
    let cert = if data.contains("-----BEGIN") {
        X509Certificate::first_in_text(data)?
    } else {
        X509Certificate::from_base64(data)?
    };
    loader::load_x509_cert(cert, algorithm::RSA_SHA256, usage)
}
