//! Two-tier caching store.
//!
//! Routes every operation by key classification: private material stays in
//! a lock-guarded directory on this node, certificates go to an injected
//! backing store so a fleet of hosts can share them. The store lives for
//! the process lifetime; there is no close or drain.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{error, info};

use crate::error::{CacheError, CacheResult};
use crate::fs::StoreFS;
use crate::keys;
use crate::local::LocalStore;
use crate::lock::{DirLock, DirLockGuard};

/// Mode applied to every blob written through the store.
const BLOB_MODE: u32 = 0o600;

/// Configuration for [`CachingStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Reject all mutations; local reads take the shared lock so multiple
    /// read-only processes can share the directory.
    pub readonly: bool,
    /// When set, the ACME account key is persisted in the backing store
    /// under this name instead of being kept node-local. Applies to reads
    /// and writes of the account key only, never to tokens or in-flight
    /// private keys.
    pub save_account_key_as: Option<String>,
}

/// A certificate cache that keeps private material on the local filesystem
/// and issued certificates in a backing store.
///
/// The backing store may be distributed (a secrets manager, an object
/// store), which lets every host in a fleet serve certificates that any one
/// of them renewed. Certificates can also be extracted safely on the host
/// that manages them by reading through a second, read-only instance.
pub struct CachingStore {
    local: LocalStore,
    lock: DirLock,
    backing: Arc<dyn StoreFS>,
    options: StoreOptions,
}

impl CachingStore {
    /// Create a store over `local_dir` (created if absent, 0700) and the
    /// given backing store.
    ///
    /// When `options.readonly` is set, the exclusive lock is taken and
    /// released once here so the lock file exists; shared acquisitions fail
    /// against a missing file.
    pub fn new(
        local_dir: impl Into<PathBuf>,
        backing: Arc<dyn StoreFS>,
        options: StoreOptions,
    ) -> CacheResult<Self> {
        let local_dir = local_dir.into();
        let local = LocalStore::new(&local_dir).map_err(|source| CacheError::Local {
            op: "init",
            name: local_dir.display().to_string(),
            source,
        })?;
        let lock = DirLock::new(local.root());

        if options.readonly {
            let guard = lock.exclusive().map_err(|source| CacheError::Lock { source })?;
            drop(guard);
        }

        Ok(Self {
            local,
            lock,
            backing,
            options,
        })
    }

    /// The options this store was constructed with.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Resolve the effective key and tier for `name`: shareable names go
    /// to the backing store under their own name, the account key is
    /// redirected to the configured alias when one is set, and everything
    /// else local-only stays in the local tier.
    fn route(&self, name: &str) -> (String, bool) {
        if !keys::is_local_only(name) {
            return (name.to_string(), true);
        }
        match self.options.save_account_key_as.as_deref() {
            Some(alias) if !alias.is_empty() && keys::is_account_key(name) => {
                (alias.to_string(), true)
            }
            _ => (name.to_string(), false),
        }
    }

    /// Fetch the blob stored under `name`, from whichever tier owns it.
    ///
    /// A missing entry is reported as [`CacheError::Miss`] regardless of
    /// which tier produced the underlying "not found".
    pub async fn get(&self, name: &str) -> CacheResult<Vec<u8>> {
        let (effective, use_backing) = self.route(name);
        if use_backing {
            return match self.backing.read(&effective).await {
                Ok(data) => Ok(data),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CacheError::Miss),
                Err(source) => Err(CacheError::Backing {
                    op: "get",
                    name: effective,
                    source,
                }),
            };
        }

        let local = self.local.clone();
        let lock = self.lock.clone();
        let shared = self.options.readonly;
        let key = name.to_string();
        task::spawn_blocking(move || {
            let _guard = acquire(&lock, shared)?;
            match local.read(&key) {
                Ok(data) => Ok(data),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CacheError::Miss),
                Err(source) => Err(CacheError::Local {
                    op: "get",
                    name: key,
                    source,
                }),
            }
        })
        .await
        .map_err(|e| join_failure("get", name, e))?
    }

    /// Store `data` under `name` in whichever tier owns it.
    pub async fn put(&self, name: &str, data: &[u8]) -> CacheResult<()> {
        if self.options.readonly {
            error!(key = %name, "readonly cache rejected write");
            return Err(CacheError::Readonly {
                op: "put",
                name: name.to_string(),
            });
        }

        let (effective, use_backing) = self.route(name);
        if use_backing {
            if let Err(source) = self.backing.write(&effective, data, BLOB_MODE).await {
                error!(key = %name, backing_key = %effective, error = %source, "backing store write failed");
                return Err(CacheError::Backing {
                    op: "put",
                    name: effective,
                    source,
                });
            }
            info!(key = %name, backing_key = %effective, "backing store write succeeded");
            return Ok(());
        }

        let local = self.local.clone();
        let lock = self.lock.clone();
        let key = name.to_string();
        let bytes = data.to_vec();
        let written = task::spawn_blocking(move || {
            let _guard = acquire(&lock, false)?;
            local.write(&key, &bytes, BLOB_MODE).map_err(|source| CacheError::Local {
                op: "put",
                name: key,
                source,
            })
        })
        .await
        .map_err(|e| join_failure("put", name, e))
        .and_then(|r| r);

        match written {
            Ok(()) => {
                info!(key = %name, "local cache write succeeded");
                Ok(())
            }
            Err(e) => {
                error!(key = %name, error = %e, "local cache write failed");
                Err(e)
            }
        }
    }

    /// Remove the blob stored under `name` from whichever tier owns it.
    ///
    /// The account-key alias does not apply here: deletes address keys by
    /// their literal names. Removing an absent local entry is not an error;
    /// a backing-store delete of a missing key surfaces whatever the
    /// backing store reports.
    pub async fn delete(&self, name: &str) -> CacheResult<()> {
        if self.options.readonly {
            return Err(CacheError::Readonly {
                op: "delete",
                name: name.to_string(),
            });
        }

        if !keys::is_local_only(name) {
            return self
                .backing
                .delete(name)
                .await
                .map_err(|source| CacheError::Backing {
                    op: "delete",
                    name: name.to_string(),
                    source,
                });
        }

        let local = self.local.clone();
        let lock = self.lock.clone();
        let key = name.to_string();
        task::spawn_blocking(move || {
            let _guard = acquire(&lock, false)?;
            match local.delete(&key) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(CacheError::Local {
                    op: "delete",
                    name: key,
                    source,
                }),
            }
        })
        .await
        .map_err(|e| join_failure("delete", name, e))?
    }
}

fn acquire(lock: &DirLock, shared: bool) -> CacheResult<DirLockGuard> {
    let acquired = if shared {
        lock.shared()
    } else {
        lock.exclusive()
    };
    acquired.map_err(|source| CacheError::Lock { source })
}

fn join_failure(op: &'static str, name: &str, err: task::JoinError) -> CacheError {
    CacheError::Local {
        op,
        name: name.to_string(),
        source: io::Error::other(err),
    }
}

/// Lets one caching store act as the backing store of another, and lets
/// manager capabilities that speak [`StoreFS`] use the cache directly. A
/// miss is rendered as [`io::ErrorKind::NotFound`]; the write mode is fixed
/// by the owning tier, not the caller.
#[async_trait]
impl StoreFS for CachingStore {
    async fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.get(name).await.map_err(CacheError::into_io)
    }

    async fn write(&self, name: &str, data: &[u8], _mode: u32) -> io::Result<()> {
        self.put(name, data).await.map_err(CacheError::into_io)
    }

    async fn delete(&self, name: &str) -> io::Result<()> {
        CachingStore::delete(self, name).await.map_err(CacheError::into_io)
    }
}
