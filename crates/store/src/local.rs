//! Node-local blob storage.
//!
//! One file per cache key directly under the configured root. `LocalStore`
//! serves two roles: the private tier of [`crate::CachingStore`] and a
//! filesystem-backed [`StoreFS`] for deployments without a distributed
//! backing store.
//!
//! Errors are the underlying filesystem errors, untranslated; mapping a
//! missing file to a cache miss is the caller's concern.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::task;
use tracing::info;

use crate::fs::StoreFS;

/// Flat per-key file storage under a directory.
///
/// Key names are confined to the root: `..` components cannot climb out of
/// the storage directory. The inherent methods are synchronous; the
/// [`StoreFS`] impl runs them on the blocking pool.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open (creating if absent) the storage directory with restrictive
    /// permissions (0700 on Unix).
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let root = dir.into();
        fs::create_dir_all(&root)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&root, fs::Permissions::from_mode(0o700))?;
        }

        info!(store_path = %root.display(), "Initialized local certificate store");

        Ok(Self { root })
    }

    /// The storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `name` to a path confined under the root: `..` pops within
    /// the accumulated relative path and never climbs above the root;
    /// absolute and current-dir components are dropped.
    fn path(&self, name: &str) -> PathBuf {
        let mut relative = PathBuf::new();
        for component in Path::new(name).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::ParentDir => {
                    relative.pop();
                }
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            }
        }
        self.root.join(relative)
    }

    /// Read the blob stored under `name`.
    pub fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path(name))
    }

    /// Write `data` under `name` with the given unix mode.
    ///
    /// The bytes land in a temporary file in the same directory and are
    /// renamed into place, so readers never observe a partial blob.
    pub fn write(&self, name: &str, data: &[u8], mode: u32) -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(mode))?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        tmp.persist(self.path(name)).map_err(|e| e.error)?;
        Ok(())
    }

    /// Remove the blob stored under `name`.
    pub fn delete(&self, name: &str) -> io::Result<()> {
        fs::remove_file(self.path(name))
    }
}

#[async_trait]
impl StoreFS for LocalStore {
    async fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let store = self.clone();
        let name = name.to_string();
        task::spawn_blocking(move || store.read(&name))
            .await
            .map_err(io::Error::other)?
    }

    async fn write(&self, name: &str, data: &[u8], mode: u32) -> io::Result<()> {
        let store = self.clone();
        let name = name.to_string();
        let data = data.to_vec();
        task::spawn_blocking(move || store.write(&name, &data, mode))
            .await
            .map_err(io::Error::other)?
    }

    async fn delete(&self, name: &str) -> io::Result<()> {
        let store = self.clone();
        let name = name.to_string();
        task::spawn_blocking(move || store.delete(&name))
            .await
            .map_err(io::Error::other)?
    }
}
