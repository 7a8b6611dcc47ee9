//! Error taxonomy for cache operations.
//!
//! Every "not found" condition, regardless of which tier produced it, is
//! translated to the single [`CacheError::Miss`] kind so callers can branch
//! structurally instead of string-matching. All other variants keep the
//! underlying cause attached.

use std::io;

use thiserror::Error;

/// Result alias for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors reported by the caching store.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The requested entry does not exist in the tier that owns it.
    ///
    /// Expected in steady state. Match on this variant (or use
    /// [`CacheError::is_miss`]) rather than inspecting messages.
    #[error("cache miss")]
    Miss,

    /// A mutation was attempted against a store constructed read-only.
    #[error("{op} {name:?}: readonly cache")]
    Readonly { op: &'static str, name: String },

    /// A filesystem operation on the node-local tier failed.
    #[error("{op} {name:?}: local store")]
    Local {
        op: &'static str,
        name: String,
        #[source]
        source: io::Error,
    },

    /// The injected backing store reported a failure.
    #[error("{op} {name:?}: backing store")]
    Backing {
        op: &'static str,
        name: String,
        #[source]
        source: io::Error,
    },

    /// The cross-process directory lock could not be acquired.
    #[error("lock acquisition failed")]
    Lock {
        #[source]
        source: io::Error,
    },
}

impl CacheError {
    /// Returns true for the canonical cache-miss kind.
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::Miss)
    }

    /// Convert into an `io::Error`, rendering a miss as
    /// [`io::ErrorKind::NotFound`] so stores compose through [`crate::StoreFS`].
    pub fn into_io(self) -> io::Error {
        match self {
            CacheError::Miss => io::Error::new(io::ErrorKind::NotFound, CacheError::Miss),
            other => io::Error::other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_miss_only_for_miss() {
        assert!(CacheError::Miss.is_miss());
        assert!(!CacheError::Readonly {
            op: "put",
            name: "x".to_string(),
        }
        .is_miss());
        assert!(!CacheError::Lock {
            source: io::Error::other("boom"),
        }
        .is_miss());
    }

    #[test]
    fn test_miss_maps_to_not_found() {
        assert_eq!(CacheError::Miss.into_io().kind(), io::ErrorKind::NotFound);
        let other = CacheError::Backing {
            op: "get",
            name: "cert".to_string(),
            source: io::Error::other("backend down"),
        }
        .into_io();
        assert_ne!(other.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_display_carries_operation_and_key() {
        let err = CacheError::Readonly {
            op: "delete",
            name: "cert-example.com".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("delete"));
        assert!(rendered.contains("cert-example.com"));
        assert!(rendered.contains("readonly"));
    }

    #[test]
    fn test_source_chain_preserved() {
        use std::error::Error as _;
        let err = CacheError::Local {
            op: "get",
            name: "k".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let source = err.source().and_then(|s| s.downcast_ref::<io::Error>());
        assert_eq!(
            source.map(|s| s.kind()),
            Some(io::ErrorKind::PermissionDenied)
        );
    }
}
