//! Ephemeral certificate authority for the credential proxy.
//!
//! A fresh CA is generated on every launch and handed to the proxy by value
//! inside its JSON configuration. The proxy uses it to mint per-host
//! certificates while intercepting HTTPS traffic.
//!
//! # Properties
//!
//! - 2048-bit RSA key pair, never written to disk
//! - Self-signed: issuer and subject are the same fixed distinguished name
//! - `basicConstraints` marks the certificate as a CA
//! - Valid for exactly two calendar years from generation
//!
//! # Example
//!
//! ```ignore
//! use proxy_launcher::proxy::CertificateAuthority;
//!
//! let ca = CertificateAuthority::generate()?;
//! assert!(ca.cert_pem().starts_with("-----BEGIN CERTIFICATE-----"));
//! ```

use std::fmt;

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, DnValue, IsCa, KeyPair,
    RsaKeySize, SerialNumber,
};
use serde::{Deserialize, Serialize};
use time::{Duration, Month, OffsetDateTime};
use tracing::{debug, info};

use super::error::CaError;

/// Validity of the generated CA, in calendar years.
pub const CA_VALIDITY_YEARS: i32 = 2;

/// Serial number stamped on every generated CA.
const CA_SERIAL: &[u8] = &[0x01];

/// Common name of the generated CA.
pub const CA_COMMON_NAME: &str = "Dependabot Internal CA";

/// Certificate authority material passed to the proxy.
///
/// Serialized as `{"cert": <PEM>, "key": <PEM>}`.
#[derive(Clone, Serialize, Deserialize)]
pub struct CertificateAuthority {
    /// PEM-encoded self-signed CA certificate.
    #[serde(rename = "cert")]
    cert_pem: String,
    /// PEM-encoded private key.
    #[serde(rename = "key")]
    key_pem: String,
}

impl CertificateAuthority {
    /// Generate a new CA.
    ///
    /// Key generation is not retried. Any failure here aborts startup.
    ///
    /// # Errors
    ///
    /// Returns error if key generation or self-signing fails.
    pub fn generate() -> Result<Self, CaError> {
        info!("Generating proxy certificate authority");

        let key_pair = KeyPair::generate_rsa_for(&rcgen::PKCS_RSA_SHA256, RsaKeySize::_2048)
            .map_err(|e| CaError::KeyGeneration(e.to_string()))?;

        let mut params = CertificateParams::default();
        params.distinguished_name = ca_distinguished_name();
        params.serial_number = Some(SerialNumber::from_slice(CA_SERIAL));
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);

        let (not_before, not_after) = validity_window(OffsetDateTime::now_utc());
        params.not_before = not_before;
        params.not_after = not_after;

        let cert = params
            .self_signed(&key_pair)
            .map_err(|e| CaError::CertGeneration(e.to_string()))?;

        debug!(
            "Certificate authority valid from {} until {}",
            not_before, not_after
        );

        Ok(Self {
            cert_pem: cert.pem(),
            key_pem: key_pair.serialize_pem(),
        })
    }

    /// CA certificate as PEM text. Safe to publish.
    pub fn cert_pem(&self) -> &str {
        &self.cert_pem
    }

    /// CA private key as PEM text.
    pub fn key_pem(&self) -> &str {
        &self.key_pem
    }
}

impl fmt::Debug for CertificateAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateAuthority")
            .field("cert_pem", &format_args!("<{} bytes>", self.cert_pem.len()))
            .field("key_pem", &"<redacted>")
            .finish()
    }
}

/// Fixed distinguished name used for both subject and issuer.
fn ca_distinguished_name() -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(
        DnType::CommonName,
        DnValue::Utf8String(CA_COMMON_NAME.to_string()),
    );
    dn.push(DnType::CountryName, DnValue::Utf8String("US".to_string()));
    dn.push(
        DnType::StateOrProvinceName,
        DnValue::Utf8String("California".to_string()),
    );
    dn.push(
        DnType::LocalityName,
        DnValue::Utf8String("San Francisco".to_string()),
    );
    dn.push(
        DnType::OrganizationName,
        DnValue::Utf8String("GitHub inc.".to_string()),
    );
    dn.push(
        DnType::OrganizationalUnitName,
        DnValue::Utf8String("Dependabot".to_string()),
    );
    dn
}

/// Compute `(not_before, not_after)` for a CA generated at `now`.
///
/// X.509 times carry whole seconds, so sub-second precision is dropped first.
/// February 29th rolls over to March 1st when the target year has no leap day.
pub(crate) fn validity_window(now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
    let not_before = now.replace_nanosecond(0).unwrap_or(now);
    let target_year = not_before.year() + CA_VALIDITY_YEARS;

    let not_after = not_before
        .replace_year(target_year)
        .or_else(|_| {
            not_before
                .replace_day(1)
                .and_then(|t| t.replace_month(Month::March))
                .and_then(|t| t.replace_year(target_year))
        })
        .unwrap_or(not_before + Duration::days(365 * i64::from(CA_VALIDITY_YEARS)));

    (not_before, not_after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use x509_parser::pem::parse_x509_pem;
    use x509_parser::public_key::PublicKey;

    fn parse(ca: &CertificateAuthority) -> x509_parser::pem::Pem {
        let (_, pem) = parse_x509_pem(ca.cert_pem().as_bytes()).unwrap();
        pem
    }

    #[test]
    fn test_cert_pem_content() {
        let ca = CertificateAuthority::generate().unwrap();
        assert!(ca.cert_pem().starts_with("-----BEGIN CERTIFICATE-----"));
        assert!(ca.cert_pem().contains("-----END CERTIFICATE-----"));
        assert!(ca.key_pem().contains("PRIVATE KEY-----"));
    }

    #[test]
    fn test_issuer_equals_subject() {
        let ca = CertificateAuthority::generate().unwrap();
        let pem = parse(&ca);
        let cert = pem.parse_x509().unwrap();

        assert_eq!(cert.issuer().to_string(), cert.subject().to_string());
        let subject = cert.subject().to_string();
        assert!(subject.contains("CN=Dependabot Internal CA"));
        assert!(subject.contains("O=GitHub inc."));
        assert!(subject.contains("OU=Dependabot"));
        assert!(subject.contains("C=US"));
        assert!(subject.contains("ST=California"));
        assert!(subject.contains("L=San Francisco"));
    }

    #[test]
    fn test_marked_as_ca_and_self_verifies() {
        let ca = CertificateAuthority::generate().unwrap();
        let pem = parse(&ca);
        let cert = pem.parse_x509().unwrap();

        let constraints = cert.basic_constraints().unwrap().unwrap();
        assert!(constraints.value.ca);
        assert!(cert.verify_signature(None).is_ok());
        assert_eq!(cert.raw_serial(), &[0x01]);
    }

    #[test]
    fn test_rsa_2048_key() {
        let ca = CertificateAuthority::generate().unwrap();
        let pem = parse(&ca);
        let cert = pem.parse_x509().unwrap();

        match cert.public_key().parsed().unwrap() {
            PublicKey::RSA(rsa) => assert_eq!(rsa.key_size(), 2048),
            _ => panic!("Expected RSA public key"),
        }
    }

    #[test]
    fn test_validity_is_two_years() {
        let ca = CertificateAuthority::generate().unwrap();
        let pem = parse(&ca);
        let cert = pem.parse_x509().unwrap();

        let not_before = cert.validity().not_before.to_datetime();
        let not_after = cert.validity().not_after.to_datetime();

        assert_eq!(not_after, validity_window(not_before).1);
    }

    #[test]
    fn test_validity_window_every_day_of_leap_year() {
        let mut day = datetime!(2024-01-01 23:59:59 UTC);
        while day.year() == 2024 {
            let (not_before, not_after) = validity_window(day);
            let span = not_after - not_before;

            assert_eq!(not_after.year(), 2026);
            assert_eq!(not_after.time(), not_before.time());
            assert!(span == Duration::days(730) || span == Duration::days(731));
            day += Duration::days(1);
        }
    }

    #[test]
    fn test_each_generation_is_fresh() {
        let first = CertificateAuthority::generate().unwrap();
        let second = CertificateAuthority::generate().unwrap();
        assert_ne!(first.key_pem(), second.key_pem());
    }

    #[test]
    fn test_validity_window_truncates_subseconds() {
        let (not_before, not_after) = validity_window(datetime!(2025-03-14 09:26:53.589 UTC));
        assert_eq!(not_before, datetime!(2025-03-14 09:26:53 UTC));
        assert_eq!(not_after, datetime!(2027-03-14 09:26:53 UTC));
    }

    #[test]
    fn test_validity_window_leap_day() {
        let (_, not_after) = validity_window(datetime!(2024-02-29 12:00 UTC));
        assert_eq!(not_after, datetime!(2026-03-01 12:00 UTC));
    }

    #[test]
    fn test_debug_redacts_key() {
        let ca = CertificateAuthority::generate().unwrap();
        let debug = format!("{:?}", ca);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("PRIVATE KEY"));
    }

    #[test]
    fn test_serializes_cert_and_key_fields() {
        let ca = CertificateAuthority::generate().unwrap();
        let json = serde_json::to_value(&ca).unwrap();
        assert_eq!(json["cert"], ca.cert_pem());
        assert_eq!(json["key"], ca.key_pem());
    }
}
