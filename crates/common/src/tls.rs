//! TLS negotiation policy shared across certfleet.
//!
//! Certificate managers pick between ECDSA and RSA chains based on what a
//! client advertises. When a refresh runs outside a real handshake the
//! advertisement is synthesized from the lists below, so the manager resolves
//! the same chain a modern browser would trigger.

use rustls::{CipherSuite, SignatureScheme};

/// Cipher suites advertised by synthetic client hellos, strongest first.
///
/// TLS 1.3 suites lead; the TLS 1.2 tail is limited to ECDHE key exchange
/// with AEAD ciphers.
pub static PREFERRED_CIPHER_SUITES: &[CipherSuite] = &[
    CipherSuite::TLS13_AES_128_GCM_SHA256,
    CipherSuite::TLS13_AES_256_GCM_SHA384,
    CipherSuite::TLS13_CHACHA20_POLY1305_SHA256,
    CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
    CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
    CipherSuite::TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
    CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
    CipherSuite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
    CipherSuite::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
];

/// Signature schemes advertised by synthetic client hellos.
///
/// ECDSA and EdDSA schemes come first so a manager holding both chain types
/// resolves the smaller certificate.
pub static PREFERRED_SIGNATURE_SCHEMES: &[SignatureScheme] = &[
    SignatureScheme::ECDSA_NISTP256_SHA256,
    SignatureScheme::ECDSA_NISTP384_SHA384,
    SignatureScheme::ECDSA_NISTP521_SHA512,
    SignatureScheme::ED25519,
    SignatureScheme::RSA_PSS_SHA256,
    SignatureScheme::RSA_PSS_SHA384,
    SignatureScheme::RSA_PSS_SHA512,
    SignatureScheme::RSA_PKCS1_SHA256,
    SignatureScheme::RSA_PKCS1_SHA384,
    SignatureScheme::RSA_PKCS1_SHA512,
];

/// The slice of a TLS client hello that certificate resolution depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelloInfo {
    /// SNI server name the resolved certificate must cover.
    pub server_name: String,
    /// Cipher suites the synthetic client offers.
    pub cipher_suites: Vec<CipherSuite>,
    /// Signature schemes the synthetic client supports.
    pub signature_schemes: Vec<SignatureScheme>,
}

impl HelloInfo {
    /// Build a hello for `server_name` carrying the process-preferred cipher
    /// suites and signature schemes.
    pub fn for_server(server_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            cipher_suites: PREFERRED_CIPHER_SUITES.to_vec(),
            signature_schemes: PREFERRED_SIGNATURE_SCHEMES.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_server_carries_preferred_policy() {
        let hello = HelloInfo::for_server("example.com");
        assert_eq!(hello.server_name, "example.com");
        assert_eq!(hello.cipher_suites, PREFERRED_CIPHER_SUITES);
        assert_eq!(hello.signature_schemes, PREFERRED_SIGNATURE_SCHEMES);
    }

    #[test]
    fn test_tls13_suites_lead() {
        let tls13 = [
            CipherSuite::TLS13_AES_128_GCM_SHA256,
            CipherSuite::TLS13_AES_256_GCM_SHA384,
            CipherSuite::TLS13_CHACHA20_POLY1305_SHA256,
        ];
        assert!(PREFERRED_CIPHER_SUITES[..3]
            .iter()
            .all(|s| tls13.contains(s)));
    }

    #[test]
    fn test_ecdsa_schemes_precede_rsa() {
        let first_rsa = PREFERRED_SIGNATURE_SCHEMES
            .iter()
            .position(|s| matches!(s, SignatureScheme::RSA_PSS_SHA256));
        let last_ecdsa = PREFERRED_SIGNATURE_SCHEMES
            .iter()
            .position(|s| matches!(s, SignatureScheme::ECDSA_NISTP521_SHA512));
        assert!(last_ecdsa < first_rsa);
    }
}
