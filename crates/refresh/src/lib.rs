//! Certfleet Refresh
//!
//! A background client that keeps certificates warm for a set of hosts.
//! Each host gets an independent supervised task that periodically asks a
//! certificate-manager capability to resolve a certificate through a
//! synthetic TLS client hello, validating the manager's cache and issuance
//! path end to end. Failing hosts retry on a shorter cadence; shutdown is
//! cooperative with a hard five second bound.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use certfleet_refresh::{CertificateSource, RefreshClient};
//!
//! # async fn demo(source: Arc<dyn CertificateSource>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = RefreshClient::new(source)
//!     .with_interval(Duration::from_secs(3600))
//!     .with_retry_interval(Duration::from_secs(60));
//!
//! let hosts = vec!["example.com".to_string(), "www.example.com".to_string()];
//! let handle = client.start(&hosts);
//!
//! // ... serve traffic ...
//!
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod client;
pub mod error;
pub mod source;

// ============================================================================
// Public API Re-exports
// ============================================================================

// Refresh client
pub use client::{
    RefreshClient, RefreshHandle, RefreshOutcome, DEFAULT_REFRESH_INTERVAL,
    DEFAULT_RETRY_INTERVAL,
};

// Errors
pub use error::{RefreshError, RefreshResult};

// Certificate-manager capability
pub use source::{BoxError, CertificateSource, ResolvedCertificate};

// Hello descriptor, re-exported for implementors of the capability
pub use certfleet_common::HelloInfo;
