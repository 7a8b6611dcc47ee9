//! Errors surfaced when stopping the refresh client.
//!
//! Transient refresh failures never reach the caller; the loops retry them
//! at the failure cadence. Only shutdown reports errors.

use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinError;

/// Result alias for refresh client operations.
pub type RefreshResult<T> = std::result::Result<T, RefreshError>;

/// Errors reported by [`crate::RefreshHandle::stop`].
#[derive(Debug, Error)]
pub enum RefreshError {
    /// Cooperative shutdown did not complete within the grace period.
    /// Still-running tasks are left to exit at their next suspension point;
    /// nothing is force-killed.
    #[error("timeout waiting for refresh tasks to stop after {grace:?}")]
    ShutdownTimeout { grace: Duration },

    /// A host's refresh task terminated abnormally (panicked or was
    /// aborted) instead of exiting cooperatively.
    #[error("refresh task for host {host:?} terminated abnormally")]
    Task {
        host: String,
        #[source]
        source: JoinError,
    },

    /// The supervising task itself terminated abnormally.
    #[error("refresh supervisor terminated abnormally")]
    Supervisor {
        #[source]
        source: JoinError,
    },
}
