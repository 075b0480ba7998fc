//! Error handling for pipelog.
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading, writing, or locking a target's PID file.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Error opening, reading, or writing the PID file itself.
    #[error("failed to access PID file: {0}")]
    Io(#[from] std::io::Error),

    /// The exclusive lock on the PID file is held by another process.
    #[error(
        "failed to lock {path:?}; is another instance already logging to that file?"
    )]
    AlreadyRunning {
        /// Path of the contended PID file.
        path: PathBuf,
    },

    /// No PID file exists for the target, so there is no instance to control.
    #[error("could not find {path:?}; is an instance running to that log file?")]
    NotFound {
        /// Path of the missing PID file.
        path: PathBuf,
    },

    /// The PID file exists but does not contain a parsable process id.
    #[error("{path:?} does not contain a process id")]
    Corrupt {
        /// Path of the malformed PID file.
        path: PathBuf,
    },

    /// The PID file names a process that is no longer running. The file is
    /// left in place; cleaning it up is not the controller's responsibility.
    #[error("{path:?} names process {pid}, but no such instance is running")]
    Stale {
        /// Path of the stale PID file.
        path: PathBuf,
        /// The process id the file recorded.
        pid: i32,
    },
}

/// Defines all possible errors that can occur in pipelog.
#[derive(Debug, Error)]
pub enum PipelogError {
    /// Error from the instance registry (PID file plus lock).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Error installing the daemon's signal handlers.
    #[error("failed to install signal handlers: {0}")]
    Signal(#[from] nix::errno::Errno),

    /// A control signal could not be delivered to the instance. The target
    /// may have exited between lookup and send; the race is reported, not
    /// retried.
    #[error(
        "failed to signal process {pid}: {source}. Maybe it terminated as we tried to communicate with it?"
    )]
    SignalDelivery {
        /// The process id the signal was addressed to.
        pid: i32,
        /// The errno returned by `kill(2)`.
        source: nix::errno::Errno,
    },

    /// The log file could not be opened or written. Fatal to the daemon.
    #[error("failed to write to log file: {0}")]
    Write(#[source] std::io::Error),
}

impl PipelogError {
    /// Maps each failure to the process exit code the CLI contract promises:
    /// 2 for "nothing to control or lock already held", 1 for everything
    /// that found an instance (or tried to) and lost it along the way.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelogError::Registry(RegistryError::AlreadyRunning { .. }) => 2,
            PipelogError::Registry(RegistryError::NotFound { .. }) => 2,
            PipelogError::Registry(_) => 1,
            PipelogError::Signal(_) => 1,
            PipelogError::SignalDelivery { .. } => 1,
            PipelogError::Write(_) => 1,
        }
    }
}
