//! Certfleet Store
//!
//! A two-tier certificate cache. Issued certificates live in an injected,
//! possibly distributed backing store so every host in a fleet can serve
//! them; private material (in-flight keys, challenge tokens, the ACME
//! account key) stays in a lock-guarded directory on the node that created
//! it.
//!
//! # Architecture
//!
//! - [`keys`] - classifies cache key names into local-only and shareable
//! - [`LocalStore`] - flat per-key file storage, also usable as a backing store
//! - [`DirLock`] - cross-process advisory lock on the local directory
//! - [`CachingStore`] - routes operations by classification and owns the
//!   locking and error-translation contract
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use certfleet_store::{CachingStore, LocalStore, StoreFS, StoreOptions};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let backing = Arc::new(LocalStore::new("/srv/certs/shared")?);
//! let store = CachingStore::new(
//!     "/var/lib/certfleet/cache",
//!     backing as Arc<dyn StoreFS>,
//!     StoreOptions::default(),
//! )?;
//!
//! let cert = store.get("cert-example.com").await?;
//! # let _ = cert;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod caching;
pub mod error;
pub mod fs;
pub mod keys;
pub mod local;
pub mod lock;

// ============================================================================
// Public API Re-exports
// ============================================================================

// Two-tier store
pub use caching::{CachingStore, StoreOptions};

// Errors
pub use error::{CacheError, CacheResult};

// Store capability
pub use fs::StoreFS;

// Key classification
pub use keys::{classify, is_account_key, is_local_only, KeyClass};

// Local tier
pub use local::LocalStore;

// Directory locking
pub use lock::{DirLock, DirLockGuard, LOCK_FILE};
