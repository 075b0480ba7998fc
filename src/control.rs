//! Controller commands: remote control of a running instance.
//!
//! Each command resolves the log target to a live instance through the
//! registry, then speaks the signal protocol: `SIGUSR1` to reopen,
//! `SIGQUIT` to stop, the null signal to poll liveness, and `SIGKILL` as
//! the bounded-wait escalation.

use std::{path::Path, thread};

use nix::{
    sys::signal::{self, Signal},
    unistd::Pid,
};
use tracing::{debug, warn};

use crate::constants::{LIVENESS_POLL_INTERVAL, WAITKILL_CHECKS};
use crate::error::PipelogError;
use crate::registry;

/// True while `pid` still answers the null-signal probe.
///
/// Any probe error counts as "gone": a process we cannot signal is
/// indistinguishable from an exited one for every operation this tool
/// performs.
fn process_alive(pid: Pid) -> bool {
    signal::kill(pid, None).is_ok()
}

fn send(pid: Pid, sig: Signal) -> Result<(), PipelogError> {
    signal::kill(pid, sig).map_err(|source| PipelogError::SignalDelivery {
        pid: pid.as_raw(),
        source,
    })
}

/// Asks the instance logging to `target` to close and reopen its log file.
/// Log rotation scripts call this after renaming the file away.
pub fn reopen(target: &Path) -> Result<(), PipelogError> {
    let pid = registry::lookup(target)?;
    debug!("requesting reopen from pid {pid}");
    send(pid, Signal::SIGUSR1)
}

/// Asks the instance to stop immediately, then waits for it to go away,
/// escalating to `SIGKILL` after the bounded wait expires.
pub fn stop(target: &Path) -> Result<(), PipelogError> {
    let pid = registry::lookup(target)?;
    debug!("requesting stop from pid {pid}");
    send(pid, Signal::SIGQUIT)?;
    wait_or_kill(pid);
    Ok(())
}

/// Blocks until the instance exits on its own. No timeout: callers that
/// need a bound use [`waitkill`].
pub fn wait(target: &Path) -> Result<(), PipelogError> {
    let pid = registry::lookup(target)?;
    debug!("waiting for pid {pid} to exit");
    while process_alive(pid) {
        thread::sleep(LIVENESS_POLL_INTERVAL);
    }
    Ok(())
}

/// Waits for the instance to exit, killing it if it is still alive after
/// the bounded number of checks.
pub fn waitkill(target: &Path) -> Result<(), PipelogError> {
    let pid = registry::lookup(target)?;
    debug!("waiting for pid {pid} to exit (bounded)");
    wait_or_kill(pid);
    Ok(())
}

/// Polls liveness once per interval; after [`WAITKILL_CHECKS`] consecutive
/// alive probes, delivers `SIGKILL` best-effort and returns after one more
/// interval. A failed kill is ignored: the process may have exited in the
/// interim, which is the outcome we wanted anyway.
fn wait_or_kill(pid: Pid) {
    let mut checks = 0;
    loop {
        if !process_alive(pid) {
            return;
        }
        checks += 1;
        if checks >= WAITKILL_CHECKS {
            warn!("pid {pid} still alive after {checks} checks; sending SIGKILL");
            let _ = signal::kill(pid, Signal::SIGKILL);
            thread::sleep(LIVENESS_POLL_INTERVAL);
            return;
        }
        thread::sleep(LIVENESS_POLL_INTERVAL);
    }
}
