//! Pipelog is a small daemon that appends lines read from stdin to a named
//! log file, plus a control protocol that lets a second invocation of the
//! same program ask the running instance to reopen, stop, or wait for that
//! file. Rotation tooling renames the log away, sends `reopen`, and the
//! daemon carries on into a fresh file without dropping a line.

/// CLI interface.
pub mod cli;

/// Constants and timing tunables.
pub mod constants;

/// Controller commands sent to a running instance.
pub mod control;

/// The read loop and the log file handle it owns.
pub mod daemon;

/// Error handling.
pub mod error;

/// PID-file discovery and exclusive locking.
pub mod registry;

/// Translation of OS signals into read-loop events.
pub mod signals;
