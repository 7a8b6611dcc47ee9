//! Cross-process mutual exclusion for the local cache directory.
//!
//! Multiple independent processes may share one cache directory, so the
//! serialization primitive is an advisory `flock` on a fixed lock file
//! inside that directory. Each acquisition opens its own descriptor, which
//! makes the lock exclude between tasks of one process as well as between
//! processes.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};

/// Name of the lock file inside the cache directory.
pub const LOCK_FILE: &str = "dir.lock";

/// Handle on the directory's lock file. Cheap to clone; acquisitions are
/// independent.
#[derive(Debug, Clone)]
pub struct DirLock {
    path: PathBuf,
}

/// Holds the lock until dropped.
#[derive(Debug)]
pub struct DirLockGuard {
    _lock: Flock<File>,
}

impl DirLock {
    /// Create a handle for the lock file inside `dir`. No file is touched
    /// until an acquisition.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(LOCK_FILE),
        }
    }

    /// Acquire the lock exclusively, creating the lock file if absent.
    /// Blocks until any current holder releases; hold times are single file
    /// operations.
    pub fn exclusive(&self) -> io::Result<DirLockGuard> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        Self::acquire(file, FlockArg::LockExclusive)
    }

    /// Acquire the lock shared, for concurrent readers across processes.
    ///
    /// The lock file is opened read-only and is NOT created here: a missing
    /// file fails with `NotFound`. A read-only store therefore takes and
    /// releases the exclusive lock once at construction, purely so the file
    /// exists for later shared acquisitions.
    pub fn shared(&self) -> io::Result<DirLockGuard> {
        let file = File::open(&self.path)?;
        Self::acquire(file, FlockArg::LockShared)
    }

    fn acquire(file: File, arg: FlockArg) -> io::Result<DirLockGuard> {
        match Flock::lock(file, arg) {
            Ok(lock) => Ok(DirLockGuard { _lock: lock }),
            Err((_, errno)) => Err(io::Error::from(errno)),
        }
    }
}
