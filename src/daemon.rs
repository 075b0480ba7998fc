//! The daemon role: the read loop and the log file handle it owns.
//!
//! One daemon process owns one [`LogSink`] and the PID-file lock for its
//! lifetime. The loop reads stdin a line at a time, appends each line to
//! the sink, and between reads reacts to the events drained from the
//! signal channel. Blocking reads are bounded by the periodic alarm so the
//! process stays responsive even when the writer on the other end of the
//! pipe goes quiet.

use std::{
    fs::{File, OpenOptions},
    io::{self, ErrorKind, Write},
    os::unix::io::RawFd,
    path::{Path, PathBuf},
    thread,
};

use tracing::{debug, info};

use crate::constants::TIMEOUT_RETRY_DELAY;
use crate::error::PipelogError;
use crate::signals::{self, SignalEvent};

/// The append-mode handle to the log target, owned by the read loop and
/// replaced wholesale on a reopen request.
#[derive(Debug)]
pub struct LogSink {
    path: PathBuf,
    file: File,
}

impl LogSink {
    /// Opens `path` for appending, creating it if necessary.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = Self::open_append(path)?;
        Ok(LogSink {
            path: path.to_path_buf(),
            file,
        })
    }

    fn open_append(path: &Path) -> io::Result<File> {
        OpenOptions::new().append(true).create(true).open(path)
    }

    /// Swaps the current handle for a freshly opened one on the same path.
    /// Rotation tooling renames the old file first, so the new open lands
    /// on a new inode.
    pub fn reopen(&mut self) -> io::Result<()> {
        self.file = Self::open_append(&self.path)?;
        debug!("reopened log file {:?}", self.path);
        Ok(())
    }

    /// Appends one line, newline-normalized: trailing CR/LF bytes are
    /// stripped and a single `\n` is written. Flushed immediately so every
    /// line is an independently persisted unit.
    pub fn append_line(&mut self, line: &[u8]) -> io::Result<()> {
        let end = line
            .iter()
            .rposition(|&b| b != b'\n' && b != b'\r')
            .map_or(0, |i| i + 1);
        self.file.write_all(&line[..end])?;
        self.file.write_all(b"\n")?;
        self.file.flush()
    }

    /// Path of the log target.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Outcome of one attempt to pull a line from the input fd.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A full line (trailing newline included, except for a partial final
    /// line at end-of-input).
    Line(Vec<u8>),
    /// Input is exhausted and the buffer is drained.
    Eof,
    /// A signal interrupted the blocking read before any new bytes arrived.
    /// Already-buffered bytes are retained for the retry.
    Interrupted,
}

/// Buffered line reader over a raw file descriptor.
///
/// Built on `read(2)` directly rather than `BufRead` because the loop needs
/// to observe `EINTR`: std's buffered readers retry interrupted reads
/// internally, which would make the alarm tick invisible.
#[derive(Debug)]
pub struct LineReader {
    fd: RawFd,
    pending: Vec<u8>,
    eof: bool,
}

impl LineReader {
    /// Wraps `fd`. The caller keeps ownership of the descriptor.
    pub fn new(fd: RawFd) -> Self {
        LineReader {
            fd,
            pending: Vec::new(),
            eof: false,
        }
    }

    /// Blocks for the next line.
    ///
    /// Bytes read before an interruption stay buffered, so a timeout tick
    /// can never lose or duplicate part of a line.
    pub fn next_line(&mut self) -> ReadOutcome {
        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.pending.drain(..=pos).collect();
                return ReadOutcome::Line(line);
            }

            if self.eof {
                if self.pending.is_empty() {
                    return ReadOutcome::Eof;
                }
                // Partial final line without a newline; yield it as-is and
                // report Eof on the next call.
                return ReadOutcome::Line(std::mem::take(&mut self.pending));
            }

            let mut chunk = [0u8; 4096];
            let count = unsafe {
                libc::read(self.fd, chunk.as_mut_ptr().cast(), chunk.len())
            };
            if count > 0 {
                self.pending.extend_from_slice(&chunk[..count as usize]);
            } else if count == 0 {
                self.eof = true;
            } else {
                let err = io::Error::last_os_error();
                if err.kind() == ErrorKind::Interrupted {
                    return ReadOutcome::Interrupted;
                }
                // Read failures other than EINTR are not expected on a
                // pipe; treat them as end-of-input.
                debug!("treating read error as end-of-input: {err}");
                self.eof = true;
            }
        }
    }
}

/// Read-loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Reading,
    TimeoutRetry,
    Terminated,
}

/// The daemon role: owns the sink and the input reader, runs the loop.
#[derive(Debug)]
pub struct Daemon {
    sink: LogSink,
    reader: LineReader,
}

impl Daemon {
    /// Opens the log target for appending and binds the loop to stdin.
    pub fn new(target: &Path) -> Result<Self, PipelogError> {
        let sink = LogSink::open(target).map_err(PipelogError::Write)?;
        Ok(Daemon {
            sink,
            reader: LineReader::new(libc::STDIN_FILENO),
        })
    }

    /// Runs the read loop until end-of-input or a terminate request.
    ///
    /// Installs the signal handlers and arms the read timeout, then cycles
    /// through `Reading`, `TimeoutRetry`, and `Terminated`. The caller
    /// releases the instance lock after this returns.
    pub fn run(&mut self) -> Result<(), PipelogError> {
        signals::install()?;
        signals::arm_read_timer();
        info!("appending stdin to {:?}", self.sink.path());

        let mut state = LoopState::Reading;
        while state != LoopState::Terminated {
            while let Some(event) = signals::take() {
                match event {
                    SignalEvent::Terminate => {
                        state = LoopState::Terminated;
                        break;
                    }
                    SignalEvent::Reopen => {
                        self.sink.reopen().map_err(PipelogError::Write)?;
                    }
                    SignalEvent::TimeoutTick => {
                        state = LoopState::TimeoutRetry;
                    }
                }
            }

            match state {
                LoopState::Terminated => {}
                LoopState::TimeoutRetry => {
                    thread::sleep(TIMEOUT_RETRY_DELAY);
                    signals::arm_read_timer();
                    state = LoopState::Reading;
                }
                LoopState::Reading => match self.reader.next_line() {
                    ReadOutcome::Line(line) => {
                        self.sink.append_line(&line).map_err(PipelogError::Write)?;
                    }
                    ReadOutcome::Eof => {
                        state = LoopState::Terminated;
                    }
                    // Loop back around to drain whichever signal fired.
                    ReadOutcome::Interrupted => {}
                },
            }
        }

        info!("read loop finished for {:?}", self.sink.path());
        Ok(())
    }
}
