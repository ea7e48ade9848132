//! Exclusive lock guarding a file's read-modify-write cycle
//!
//! The lock is a sibling `<name>.lock` file created with `O_EXCL`, so a second
//! writer is rejected instead of interleaving with the first. The new content is
//! written into the lock file itself and renamed over the target on commit; a
//! lock dropped without committing removes its file and leaves the target as it was.
//!
//! Readers take a shared `file_guard` lock on the target itself. Commit holds an
//! exclusive lock on the current target across the rename, so it waits for
//! in-flight reads of the old content.

use crate::errors::{BitError, Result};
use file_guard::Lock;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct Lockfile {
    target_path: PathBuf,
    lock_path: PathBuf,
    file: File,
    committed: bool,
}

impl Lockfile {
    /// Create `<target>.lock` next to `target_path`
    ///
    /// # Returns
    ///
    /// The held lock. Fails with `IndexLocked` when the lock file already exists,
    /// which means another writer is active or a previous one crashed.
    pub fn acquire(target_path: &Path) -> Result<Self> {
        let lock_path = Self::lock_path_for(target_path);

        let file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::AlreadyExists => BitError::IndexLocked {
                    path: lock_path.clone(),
                },
                _ => BitError::Io(err),
            })?;

        debug!(path = %lock_path.display(), "acquired lock");

        Ok(Lockfile {
            target_path: target_path.to_path_buf(),
            lock_path,
            file,
            committed: false,
        })
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Replace the target's content with `data` in a single rename
    ///
    /// # Arguments
    ///
    /// * `data` - Complete new content of the target
    ///
    /// # Locking
    ///
    /// An existing target is locked exclusively until it has been replaced.
    pub fn commit(mut self, data: &[u8]) -> Result<()> {
        self.file.write_all(data)?;
        self.file.sync_all()?;

        let mut target_file = match std::fs::OpenOptions::new()
            .write(true)
            .open(&self.target_path)
        {
            Ok(target_file) => Some(target_file),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };
        let target_lock = target_file
            .as_mut()
            .map(|target_file| file_guard::lock(target_file, Lock::Exclusive, 0, 1))
            .transpose()?;

        std::fs::rename(&self.lock_path, &self.target_path)?;
        drop(target_lock);
        self.committed = true;
        debug!(path = %self.target_path.display(), bytes = data.len(), "committed lock");

        Ok(())
    }

    fn lock_path_for(target_path: &Path) -> PathBuf {
        let mut name = target_path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    #[test]
    fn second_lock_is_rejected_while_first_is_held() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("index");

        let first = Lockfile::acquire(&target).unwrap();
        assert!(matches!(
            Lockfile::acquire(&target),
            Err(BitError::IndexLocked { .. })
        ));

        drop(first);
        assert!(Lockfile::acquire(&target).is_ok());
    }

    #[test]
    fn commit_replaces_target_and_releases_lock() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("index");
        std::fs::write(&target, b"old").unwrap();

        let lock = Lockfile::acquire(&target).unwrap();
        let lock_path = lock.lock_path().to_path_buf();
        lock.commit(b"new").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new".to_vec());
        assert!(!lock_path.exists());
    }

    #[test]
    fn abandoned_lock_leaves_target_untouched() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("index");
        std::fs::write(&target, b"old").unwrap();

        let lock = Lockfile::acquire(&target).unwrap();
        let lock_path = lock.lock_path().to_path_buf();
        drop(lock);

        assert_eq!(std::fs::read(&target).unwrap(), b"old".to_vec());
        assert!(!lock_path.exists());
    }

    #[test]
    fn commit_creates_a_missing_target() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("index");

        Lockfile::acquire(&target).unwrap().commit(b"first").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"first".to_vec());
    }

    #[test]
    fn target_is_unlocked_after_commit() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("index");
        std::fs::write(&target, b"old").unwrap();

        Lockfile::acquire(&target).unwrap().commit(b"new").unwrap();

        let mut target_file = std::fs::OpenOptions::new()
            .write(true)
            .open(&target)
            .unwrap();
        assert!(file_guard::try_lock(&mut target_file, Lock::Exclusive, 0, 1).is_ok());
    }
}
