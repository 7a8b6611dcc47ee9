//! The store capability consumed and provided by the cache.

use std::io;

use async_trait::async_trait;

/// Named-blob storage: the seam between the cache and any backing store.
///
/// Implementations report a missing entry as [`io::ErrorKind::NotFound`];
/// the caching layer translates that into its canonical miss. `mode` is a
/// unix permission hint that filesystem-backed implementations apply and
/// others ignore.
///
/// Satisfied by [`crate::LocalStore`], by [`crate::CachingStore`] itself
/// (so caches compose), and by any externally supplied distributed store.
#[async_trait]
pub trait StoreFS: Send + Sync {
    /// Read the blob stored under `name`.
    async fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Write `data` under `name`, replacing any previous blob.
    async fn write(&self, name: &str, data: &[u8], mode: u32) -> io::Result<()>;

    /// Remove the blob stored under `name`.
    async fn delete(&self, name: &str) -> io::Result<()>;
}
