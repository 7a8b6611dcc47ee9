//! The certificate-manager capability driven by the refresh loops.

use async_trait::async_trait;
use certfleet_common::HelloInfo;
use chrono::{DateTime, Utc};

/// Errors from a certificate source are opaque to the refresh loop; it
/// retries regardless of the cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A certificate manager's lookup/issuance path.
///
/// A resolve call travels the same route a real TLS handshake would, so a
/// success proves the cache and issuance machinery end to end rather than
/// just inspecting stored bytes.
#[async_trait]
pub trait CertificateSource: Send + Sync {
    /// Resolve a certificate satisfying `hello`.
    async fn resolve(&self, hello: &HelloInfo) -> Result<ResolvedCertificate, BoxError>;
}

/// The fields of a resolved leaf certificate the refresh loop inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCertificate {
    /// Expiry of the leaf.
    pub not_after: DateTime<Utc>,
    /// Big-endian serial number bytes of the leaf.
    pub serial: Vec<u8>,
}

impl ResolvedCertificate {
    /// True when the leaf had already expired at `now`. A leaf expiring
    /// exactly at `now` is not yet expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.not_after
    }

    /// Serial number as lowercase hex, two digits per byte.
    pub fn serial_hex(&self) -> String {
        hex::encode(&self.serial)
    }
}
