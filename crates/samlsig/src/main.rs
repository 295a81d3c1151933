#![forbid(unsafe_code)]

//! samlsig CLI: verify and sign SAML elements.

use clap::{Parser, Subcommand, ValueEnum};
use samlsig::core::algorithm;
use samlsig::keys::{loader, X509Certificate};
use samlsig::{ChildRef, Error, IdentityProvider, SignatureValidator, SignedElement};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "samlsig", about = "SAML2 signature trust checks", version)]
struct Cli {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Shorthand for --log-level debug
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a document's signature is trusted by an identity provider
    Verify {
        /// Input XML file
        file: PathBuf,

        /// Identity provider configuration (TOML)
        #[arg(long)]
        idp: PathBuf,
    },

    /// List the embedded certificates that validate a document's signature
    Certs {
        /// Input XML file
        file: PathBuf,

        /// Print the certificates as PEM as well
        #[arg(long)]
        pem: bool,
    },

    /// Sign the document element of an XML file
    Sign {
        /// Input XML file
        file: PathBuf,

        /// RSA private key (PEM)
        #[arg(short = 'k', long)]
        key: PathBuf,

        /// Certificate to embed in KeyInfo (PEM, repeatable)
        #[arg(long)]
        cert: Vec<PathBuf>,

        /// Insert the signature before the first child with this local name
        #[arg(long)]
        before: Option<String>,

        /// Signature method
        #[arg(long, value_enum, default_value_t = Method::RsaSha256)]
        method: Method,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    RsaSha1,
    RsaSha256,
    RsaSha384,
    RsaSha512,
}

impl Method {
    fn uri(self) -> &'static str {
        match self {
            Self::RsaSha1 => algorithm::RSA_SHA1,
            Self::RsaSha256 => algorithm::RSA_SHA256,
            Self::RsaSha384 => algorithm::RSA_SHA384,
            Self::RsaSha512 => algorithm::RSA_SHA512,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { cli.log_level.as_str() };
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match cli.command {
        Commands::Verify { file, idp } => cmd_verify(&file, &idp),
        Commands::Certs { file, pem } => cmd_certs(&file, pem),
        Commands::Sign {
            file,
            key,
            cert,
            before,
            method,
            output,
        } => cmd_sign(&file, &key, &cert, before, method, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn cmd_verify(file: &Path, idp: &Path) -> Result<(), Error> {
    let configuration = IdentityProvider::from_file(idp)?;
    let element = SignedElement::from_xml(&read_file(file)?)?;
    tracing::info!(entity_id = %configuration.entity_id, file = %file.display(), "verifying");

    if SignatureValidator::new().has_valid_signature(&element, &configuration)? {
        println!("OK");
        Ok(())
    } else {
        Err(Error::VerificationFailure(format!(
            "signature is not trusted by {}",
            configuration.entity_id
        )))
    }
}

fn cmd_certs(file: &Path, pem: bool) -> Result<(), Error> {
    let element = SignedElement::from_xml(&read_file(file)?)?;
    if !element.is_signed() {
        return Err(Error::VerificationFailure(format!(
            "{}: no usable signature",
            file.display()
        )));
    }

    for body in element.validating_certificates() {
        let cert = X509Certificate::from_base64(&body)?;
        println!("{}", colon_separated(&cert.fingerprint()));
        if pem {
            print!("{}", cert.to_pem()?);
        }
    }
    Ok(())
}

fn cmd_sign(
    file: &Path,
    key: &Path,
    certs: &[PathBuf],
    before: Option<String>,
    method: Method,
    output: Option<PathBuf>,
) -> Result<(), Error> {
    let xml = read_file(file)?;
    let key = loader::load_key_file(key, method.uri())?;
    let certificates = certs
        .iter()
        .map(|path| -> Result<String, Error> {
            let cert = X509Certificate::first_in_text(&read_file(path)?)?;
            Ok(cert.base64().to_owned())
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut element = SignedElement::new();
    element.set_signature_key(Some(key));
    element.set_signing_certificates(certificates);

    let insert_before = before.map(ChildRef::local);
    let signed = element
        .sign(&xml, insert_before.as_ref())?
        .ok_or_else(|| Error::Key("no signing key configured".into()))?;
    write_output(output, signed.as_bytes())
}

fn read_file(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))))
}

fn write_output(path: Option<PathBuf>, data: &[u8]) -> Result<(), Error> {
    match path {
        Some(p) => std::fs::write(&p, data)
            .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("{}: {e}", p.display())))),
        None => {
            use std::io::Write;
            std::io::stdout().write_all(data)?;
            Ok(())
        }
    }
}

fn colon_separated(hex: &str) -> String {
    hex.as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).to_uppercase())
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ROLLOVER: &str = "../../test-data/saml/response-signed-rollover.xml";

    fn idp_config(cert: &str) -> tempfile::NamedTempFile {
        let cert = std::fs::canonicalize(format!("../../test-data/keys/{cert}.crt.pem")).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"entity_id = "https://idp.example.org""#).unwrap();
        writeln!(file, "certificate_file = {:?}", cert.display().to_string()).unwrap();
        file
    }

    #[test]
    fn verify_reports_untrusted_signature_as_error() {
        let trusted = idp_config("idp-rollover");
        assert!(cmd_verify(Path::new(ROLLOVER), trusted.path()).is_ok());

        let untrusted = idp_config("idp");
        assert!(matches!(
            cmd_verify(Path::new(ROLLOVER), untrusted.path()),
            Err(Error::VerificationFailure(message)) if message.contains("https://idp.example.org")
        ));
    }

    #[test]
    fn certs_reports_unsigned_document_as_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<a ID=\"_x\"/>").unwrap();
        assert!(matches!(
            cmd_certs(file.path(), false),
            Err(Error::VerificationFailure(_))
        ));
        assert!(cmd_certs(Path::new(ROLLOVER), false).is_ok());
    }

    #[test]
    fn colon_separated_fingerprint() {
        assert_eq!(colon_separated("0a1b2c"), "0A:1B:2C");
    }
}
