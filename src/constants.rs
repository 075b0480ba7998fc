//! Constants and tunables for the pipelog daemon and its controllers.
//!
//! This module centralizes the timing values that shape the coordination
//! protocol so they are named in one place rather than scattered as magic
//! numbers.

use std::time::Duration;

// ============================================================================
// File System Constants
// ============================================================================

/// Suffix appended to the log target path to form the lock/PID file.
/// `plog /var/log/app.log` claims `/var/log/app.log.pid`.
pub const PID_FILE_SUFFIX: &str = ".pid";

// ============================================================================
// Read Loop Timing
// ============================================================================

/// Seconds between `SIGALRM` ticks while the daemon blocks on stdin.
/// Each tick interrupts the pending read so the loop can re-check state.
pub const READ_TIMEOUT_SECS: u32 = 5;

/// How long the read loop sleeps after a timeout tick before retrying the
/// blocking read. Bounds CPU usage while keeping the loop responsive.
pub const TIMEOUT_RETRY_DELAY: Duration = Duration::from_millis(250);

// ============================================================================
// Controller Timing
// ============================================================================

/// Interval between liveness probes in the `wait` and `waitkill` loops.
/// This is the tunable poll cadence for all controller-side waiting.
pub const LIVENESS_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Number of consecutive alive probes `waitkill` tolerates before it
/// escalates to `SIGKILL`.
pub const WAITKILL_CHECKS: usize = 30;
