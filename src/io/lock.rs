//! Run lock on the storage root.
//!
//! Two overlapping runs would write the same per-day manifests and videos, so
//! a run holds an exclusive advisory lock on `<storage_root>/.daylapse.lock`
//! until it finishes. The lock is released when the [`RunLock`] is dropped or
//! the process exits.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::constants::LOCK_FILE_NAME;
use crate::error::LockError;

#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Take the lock without blocking; fails if another run holds it.
    pub fn acquire(storage_root: &Path) -> Result<Self, LockError> {
        let path = storage_root.join(LOCK_FILE_NAME);
        let open_error = |source| LockError::Open {
            path: path.clone(),
            source,
        };

        // Keep existing content until we own the lock
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(open_error)?;

        if file.try_lock_exclusive().is_err() {
            return Err(LockError::AlreadyRunning(path));
        }

        file.set_len(0).map_err(open_error)?;
        file.seek(SeekFrom::Start(0)).map_err(open_error)?;
        writeln!(file, "{}", std::process::id()).map_err(open_error)?;
        file.flush().map_err(open_error)?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
