//! Ephemeral TLS identity generation.
//!
//! # Responsibilities
//! - Generate a fresh 2048-bit RSA key pair per bootstrap
//! - Self-sign a certificate for `localhost` valid for 180 days
//! - Assemble the rustls server configuration (single cert, ALPN list)
//!
//! # Design Decisions
//! - Nothing touches the disk; the identity lives as long as the listener
//! - Serial number is the constant `1` since certificates are never persisted
//! - The crypto provider is selected explicitly rather than process-wide

use std::sync::Arc;

use rcgen::{CertificateParams, CustomExtension, DistinguishedName, DnType, KeyPair, SerialNumber};
use rsa::pkcs8::EncodePrivateKey;
use rsa::RsaPrivateKey;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

/// RSA modulus size for the generated key.
pub const KEY_BITS: usize = 2048;

/// How long the certificate stays valid after generation.
pub const VALIDITY: Duration = Duration::days(180);

/// Subject (and issuer) common name.
pub const COMMON_NAME: &str = "localhost";

const CERT_SERIAL: u8 = 1;

/// id-ce-keyUsage (2.5.29.15).
const OID_KEY_USAGE: &[u64] = &[2, 5, 29, 15];

/// DER BIT STRING with digitalSignature (bit 0) and keyEncipherment (bit 2)
/// set; 5 unused trailing bits.
const KEY_USAGE_DS_KE: &[u8] = &[0x03, 0x02, 0x05, 0xa0];

const ALPN_H2: &[u8] = b"h2";
const ALPN_HTTP11: &[u8] = b"http/1.1";

/// Errors raised while bootstrapping the TLS identity.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The RNG or the RSA key generation (or its PKCS#8 encoding) failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(#[source] rsa::Error),

    /// Building or signing the certificate failed.
    #[error("certificate signing failed: {0}")]
    CertificateSigning(#[from] rcgen::Error),

    /// rustls rejected the generated certificate/key pair.
    #[error("TLS configuration failed: {0}")]
    TlsConfig(#[from] rustls::Error),
}

/// A throwaway server identity: one self-signed certificate and its key.
pub struct EphemeralIdentity {
    certificate: CertificateDer<'static>,
    private_key: PrivatePkcs8KeyDer<'static>,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
}

impl EphemeralIdentity {
    /// DER-encoded certificate.
    pub fn certificate(&self) -> &CertificateDer<'static> {
        &self.certificate
    }

    /// PKCS#8 DER-encoded private key.
    pub fn private_key(&self) -> &PrivatePkcs8KeyDer<'static> {
        &self.private_key
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> OffsetDateTime {
        self.not_after
    }
}

impl std::fmt::Debug for EphemeralIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        f.debug_struct("EphemeralIdentity")
            .field("common_name", &COMMON_NAME)
            .field("not_before", &self.not_before)
            .field("not_after", &self.not_after)
            .finish_non_exhaustive()
    }
}

/// Generate a fresh key pair and a self-signed certificate for it.
pub fn generate_identity() -> Result<EphemeralIdentity, BootstrapError> {
    let rsa_key = RsaPrivateKey::new(&mut rand::rngs::OsRng, KEY_BITS)
        .map_err(BootstrapError::KeyGeneration)?;
    let pkcs8 = rsa_key
        .to_pkcs8_der()
        .map_err(|e| BootstrapError::KeyGeneration(rsa::Error::Pkcs8(e)))?;
    let private_key = PrivatePkcs8KeyDer::from(pkcs8.as_bytes().to_vec());

    let key_pair = KeyPair::from_pkcs8_der_and_sign_algo(&private_key, &rcgen::PKCS_RSA_SHA256)?;

    // DER validity times carry whole seconds; truncate up front so the
    // encoded window is exactly VALIDITY long.
    let now = OffsetDateTime::now_utc();
    let not_before = now - Duration::nanoseconds(i64::from(now.nanosecond()));
    let not_after = not_before + VALIDITY;

    let mut subject = DistinguishedName::new();
    subject.push(DnType::CommonName, COMMON_NAME);

    let mut params = CertificateParams::default();
    params.serial_number = Some(SerialNumber::from_slice(&[CERT_SERIAL]));
    params.distinguished_name = subject;
    params.not_before = not_before;
    params.not_after = not_after;
    // rcgen only serializes `key_usages` when some other extension is
    // present, so key usage is written as an explicit critical extension.
    params.custom_extensions.push(key_usage_extension());

    let certificate = params.self_signed(&key_pair)?;

    tracing::debug!(
        common_name = COMMON_NAME,
        not_before = %not_before,
        not_after = %not_after,
        "Generated ephemeral certificate"
    );

    Ok(EphemeralIdentity {
        certificate: certificate.der().clone(),
        private_key,
        not_before,
        not_after,
    })
}

fn key_usage_extension() -> CustomExtension {
    let mut ext = CustomExtension::from_oid_content(OID_KEY_USAGE, KEY_USAGE_DS_KE.to_vec());
    ext.set_criticality(true);
    ext
}

/// ALPN protocols advertised by the listener, most preferred first.
pub fn alpn_protocols(advertise_h2: bool) -> Vec<Vec<u8>> {
    if advertise_h2 {
        vec![ALPN_H2.to_vec(), ALPN_HTTP11.to_vec()]
    } else {
        vec![ALPN_HTTP11.to_vec()]
    }
}

/// Build a rustls server configuration presenting exactly `identity`.
pub fn build_tls_config(
    identity: &EphemeralIdentity,
    advertise_h2: bool,
) -> Result<Arc<rustls::ServerConfig>, BootstrapError> {
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());

    let mut config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(
            vec![identity.certificate.clone()],
            PrivateKeyDer::Pkcs8(identity.private_key.clone_key()),
        )?;
    config.alpn_protocols = alpn_protocols(advertise_h2);

    Ok(Arc::new(config))
}

/// Generate an identity and wrap it into a ready-to-serve TLS configuration.
pub fn bootstrap(
    advertise_h2: bool,
) -> Result<(EphemeralIdentity, Arc<rustls::ServerConfig>), BootstrapError> {
    let identity = generate_identity()?;
    let config = build_tls_config(&identity, advertise_h2)?;
    Ok((identity, config))
}
