//! Signal channel: translates asynchronous OS signals into the three
//! logical events the read loop consumes.
//!
//! `SIGUSR1` requests a log-file reopen, `SIGQUIT` and `SIGPIPE` both
//! request termination (orderly shutdown and vanished pipe reader
//! respectively), and `SIGALRM` delivers the periodic timeout tick that
//! keeps a blocked read from parking the process forever.
//!
//! Handlers only store atomic flags; everything else happens on the main
//! thread when [`take`] drains them. The handlers are installed without
//! `SA_RESTART` on purpose: a pending `read(2)` has to come back with
//! `EINTR` for the tick to be observable at all.

use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use nix::unistd::alarm;

use crate::constants::READ_TIMEOUT_SECS;

static REOPEN_REQUESTED: AtomicBool = AtomicBool::new(false);
static TERMINATE_REQUESTED: AtomicBool = AtomicBool::new(false);
static TIMEOUT_TICK: AtomicBool = AtomicBool::new(false);

/// Logical events delivered by the signal channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// Close and reopen the log file handle (sent by log rotation tooling).
    Reopen,
    /// Exit the read loop without further reads.
    Terminate,
    /// The periodic read timeout fired; retry the blocking read after a
    /// short sleep.
    TimeoutTick,
}

extern "C" fn handle_reopen(_signum: libc::c_int) {
    REOPEN_REQUESTED.store(true, Ordering::SeqCst);
}

extern "C" fn handle_terminate(_signum: libc::c_int) {
    TERMINATE_REQUESTED.store(true, Ordering::SeqCst);
}

extern "C" fn handle_tick(_signum: libc::c_int) {
    TIMEOUT_TICK.store(true, Ordering::SeqCst);
}

/// Installs the daemon's signal handlers.
///
/// Must be called during single-threaded startup, before the read loop
/// begins. Alters process-wide signal disposition.
pub fn install() -> Result<(), nix::errno::Errno> {
    let reopen = SigAction::new(
        SigHandler::Handler(handle_reopen),
        SaFlags::empty(),
        SigSet::empty(),
    );
    let terminate = SigAction::new(
        SigHandler::Handler(handle_terminate),
        SaFlags::empty(),
        SigSet::empty(),
    );
    let tick = SigAction::new(
        SigHandler::Handler(handle_tick),
        SaFlags::empty(),
        SigSet::empty(),
    );

    unsafe {
        sigaction(Signal::SIGUSR1, &reopen)?;
        sigaction(Signal::SIGQUIT, &terminate)?;
        sigaction(Signal::SIGPIPE, &terminate)?;
        sigaction(Signal::SIGALRM, &tick)?;
    }

    Ok(())
}

/// Drains one pending event, termination first.
///
/// A terminate request always wins over a simultaneously pending reopen or
/// tick, so the loop never reopens a file it is about to abandon.
pub fn take() -> Option<SignalEvent> {
    if TERMINATE_REQUESTED.swap(false, Ordering::SeqCst) {
        return Some(SignalEvent::Terminate);
    }
    if REOPEN_REQUESTED.swap(false, Ordering::SeqCst) {
        return Some(SignalEvent::Reopen);
    }
    if TIMEOUT_TICK.swap(false, Ordering::SeqCst) {
        return Some(SignalEvent::TimeoutTick);
    }
    None
}

/// Arms (or re-arms) the read timeout alarm.
pub fn arm_read_timer() {
    alarm::set(READ_TIMEOUT_SECS);
}
