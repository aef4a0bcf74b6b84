//! Atomic publisher: an RAII lock file that is written in place, then
//! renamed over the target on success, and removed on any other exit path.
//! Retries directory creation once if the target's parent doesn't exist
//! yet, matching `commit-graph.c::write_commit_graph`'s fallback when
//! `info/` is missing.

use crate::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const LOCK_SUFFIX: &str = ".lock";

pub struct LockFile {
    target: PathBuf,
    lock_path: PathBuf,
    file: Option<File>,
    committed: bool,
}

impl LockFile {
    /// Acquires an exclusive lock on `target`'s sibling `.lock` file. If
    /// `target`'s parent directory doesn't exist yet, it is created once
    /// with a permissive mode and acquisition is retried; a second failure
    /// is fatal.
    #[tracing::instrument]
    pub fn acquire(target: impl AsRef<Path> + std::fmt::Debug) -> Result<Self, Error> {
        let target = target.as_ref().to_path_buf();
        let lock_path = lock_path_for(&target);

        match create_exclusive(&lock_path) {
            Ok(file) => Ok(LockFile {
                target,
                lock_path,
                file: Some(file),
                committed: false,
            }),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Err(Error::LockHeld(lock_path)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let parent = target
                    .parent()
                    .ok_or_else(|| Error::Io(err, lock_path.clone()))?;
                tracing::warn!(dir = %parent.display(), "commit-graph target directory missing, creating it");
                create_dir_permissive(parent).map_err(|e| Error::Io(e, parent.to_path_buf()))?;
                let file = create_exclusive(&lock_path).map_err(|e| {
                    if e.kind() == io::ErrorKind::AlreadyExists {
                        Error::LockHeld(lock_path.clone())
                    } else {
                        Error::Io(e, lock_path.clone())
                    }
                })?;
                Ok(LockFile {
                    target,
                    lock_path,
                    file: Some(file),
                    committed: false,
                })
            }
            Err(err) => Err(Error::Io(err, lock_path)),
        }
    }

    /// Flushes and fsyncs the lock file, then atomically renames it over
    /// the target. Readers of `target` now see either the previous
    /// complete file or this new one, never a partial one.
    #[tracing::instrument(skip(self))]
    pub fn commit(mut self) -> Result<(), Error> {
        let file = self.file.as_mut().expect("commit called only once");
        file.flush().map_err(|e| Error::Io(e, self.lock_path.clone()))?;
        file.sync_all().map_err(|e| Error::Io(e, self.lock_path.clone()))?;
        self.file.take();

        fs::rename(&self.lock_path, &self.target).map_err(|e| Error::Io(e, self.target.clone()))?;
        self.committed = true;
        tracing::debug!(target = %self.target.display(), "published commit-graph");
        Ok(())
    }
}

impl Write for LockFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file
            .as_mut()
            .expect("write called before commit")
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file
            .as_mut()
            .expect("write called before commit")
            .flush()
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if !self.committed {
            self.file.take();
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}

fn lock_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(LOCK_SUFFIX);
    PathBuf::from(name)
}

fn create_exclusive(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

#[cfg(unix)]
fn create_dir_permissive(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().mode(0o777).create(path)
}

#[cfg(not(unix))]
fn create_dir_permissive(path: &Path) -> io::Result<()> {
    fs::DirBuilder::new().create(path)
}
