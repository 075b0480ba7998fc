//! Instance registry: discovery and exclusive claim of log targets.
//!
//! A log target `<file>` is owned by at most one daemon at a time. Ownership
//! is recorded in `<file>.pid` and enforced by an advisory exclusive lock on
//! that file, held for the owning process's entire lifetime. The pid value
//! inside is only a routing hint for controllers; a stale pid with no live
//! lock holder means "no instance".

use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use nix::{sys::signal, unistd::Pid};
use tracing::debug;

use crate::constants::PID_FILE_SUFFIX;
use crate::error::RegistryError;

/// Returns the lock/PID file path for a log target.
pub fn pid_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(PID_FILE_SUFFIX);
    PathBuf::from(name)
}

/// Exclusive claim on a log target, backed by a flocked PID file.
///
/// The handle must stay open for as long as the daemon runs; dropping it
/// releases the lock. The file itself is left behind on exit so that the
/// lock, not the file's existence, is what defines a live instance.
#[derive(Debug)]
pub struct InstanceLock {
    _file: File,
    path: PathBuf,
}

impl InstanceLock {
    /// Claims `target` for the calling process.
    ///
    /// Opens (creating if necessary) the PID file, takes a non-blocking
    /// exclusive lock, and records the caller's pid. Fails with
    /// [`RegistryError::AlreadyRunning`] when another process holds the lock.
    pub fn acquire(target: &Path) -> Result<Self, RegistryError> {
        let path = pid_path(target);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        if let Err(err) = file.try_lock_exclusive() {
            if err.kind() == ErrorKind::WouldBlock {
                return Err(RegistryError::AlreadyRunning { path });
            }
            return Err(RegistryError::Io(err));
        }

        // Truncate before writing so a shorter pid never leaves digits from
        // a previous owner behind.
        file.set_len(0)?;
        let mut writer = &file;
        writeln!(writer, "{}", std::process::id())?;
        writer.flush()?;

        debug!("claimed {:?} for pid {}", path, std::process::id());
        Ok(InstanceLock { _file: file, path })
    }

    /// Path of the locked PID file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolves the instance currently logging to `target`.
///
/// Reads the PID file, parses the recorded id, and probes it with the null
/// signal. Fails with [`RegistryError::NotFound`] when no PID file exists,
/// [`RegistryError::Corrupt`] when it is unparsable, and
/// [`RegistryError::Stale`] when the recorded process cannot be signalled.
/// The stale file is left in place.
pub fn lookup(target: &Path) -> Result<Pid, RegistryError> {
    let path = pid_path(target);
    let contents = fs::read_to_string(&path).map_err(|err| {
        if err.kind() == ErrorKind::NotFound {
            RegistryError::NotFound { path: path.clone() }
        } else {
            RegistryError::Io(err)
        }
    })?;

    let pid = contents
        .trim()
        .parse::<i32>()
        .map_err(|_| RegistryError::Corrupt { path: path.clone() })?;

    let pid = Pid::from_raw(pid);
    match signal::kill(pid, None) {
        Ok(()) => Ok(pid),
        Err(_) => Err(RegistryError::Stale {
            path,
            pid: pid.as_raw(),
        }),
    }
}
