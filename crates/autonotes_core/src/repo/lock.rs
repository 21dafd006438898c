//! Notebook mutual exclusion.
//!
//! One lock file per notebook directory, created with `create_new` so a
//! second holder fails instead of waiting. The file records the holder pid
//! and is removed on drop. A lock left behind by a process that no longer
//! exists is taken over.

use super::notebook_repo::{RepoError, RepoResult};
use log::{debug, warn};
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Guard holding the notebook lock until dropped.
#[derive(Debug)]
pub struct NotebookLock {
    path: PathBuf,
}

impl NotebookLock {
    /// Acquires the lock at `path`.
    ///
    /// # Errors
    /// - `Locked` when a live process holds the lock, or when the holder
    ///   cannot be identified.
    /// - `Io` when the lock file cannot be created or cleared.
    pub fn acquire(path: &Path) -> RepoResult<Self> {
        match Self::create(path) {
            Err(RepoError::Locked { holder: Some(pid), .. }) if !process_alive(pid) => {
                warn!(
                    "event=lock_acquire module=repo status=stale path={} holder={}",
                    path.display(),
                    pid
                );
                match std::fs::remove_file(path) {
                    Ok(()) => {}
                    Err(err) if err.kind() == ErrorKind::NotFound => {}
                    Err(err) => return Err(RepoError::io(path, err)),
                }
                Self::create(path)
            }
            result => result,
        }
    }

    fn create(path: &Path) -> RepoResult<Self> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|err| {
                if err.kind() == ErrorKind::AlreadyExists {
                    RepoError::Locked {
                        path: path.to_path_buf(),
                        holder: read_holder(path),
                    }
                } else {
                    RepoError::io(path, err)
                }
            })?;
        if let Err(err) = writeln!(file, "{}", std::process::id()) {
            let _ = std::fs::remove_file(path);
            return Err(RepoError::io(path, err));
        }
        debug!("event=lock_acquire module=repo status=ok path={}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

impl Drop for NotebookLock {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            warn!(
                "event=lock_release module=repo status=error path={} error={}",
                self.path.display(),
                err
            );
        }
    }
}

fn read_holder(path: &Path) -> Option<i32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn process_alive(pid: i32) -> bool {
    pid > 0 && kill(Pid::from_raw(pid), None).is_ok()
}
