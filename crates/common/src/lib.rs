//! Certfleet Common
//!
//! Shared building blocks for the certfleet crates:
//!
//! - **TLS policy**: the preferred cipher suite and signature scheme lists
//!   advertised when refreshing certificates, and the [`HelloInfo`]
//!   descriptor that carries them
//! - **Metric seams**: callback types for counters and observers so any
//!   metrics backend can be bridged in without a hard dependency

// ============================================================================
// Module Declarations
// ============================================================================

pub mod metrics;
pub mod tls;

// ============================================================================
// Public API Re-exports
// ============================================================================

// Metric callbacks
pub use metrics::{noop_counter_vec, CounterVecInc};

// TLS policy
pub use tls::{HelloInfo, PREFERRED_CIPHER_SUITES, PREFERRED_SIGNATURE_SCHEMES};
