//! Command-line interface for pipelog.
use std::{fmt, path::PathBuf, str::FromStr};

use clap::{Parser, ValueEnum};
use tracing::level_filters::LevelFilter;

/// Wrapper around `LevelFilter` so clap can parse log levels from their
/// string names ("info", "debug", etc.).
#[derive(Clone, Copy, Debug)]
pub struct LogLevelArg(LevelFilter);

impl LogLevelArg {
    /// String representation suitable for an `EnvFilter` directive.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            LevelFilter::OFF => "off",
            LevelFilter::ERROR => "error",
            LevelFilter::WARN => "warn",
            LevelFilter::INFO => "info",
            LevelFilter::DEBUG => "debug",
            LevelFilter::TRACE => "trace",
        }
    }
}

impl FromStr for LogLevelArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let level = match value.trim().to_ascii_lowercase().as_str() {
            "off" => LevelFilter::OFF,
            "error" | "err" => LevelFilter::ERROR,
            "warn" | "warning" => LevelFilter::WARN,
            "info" => LevelFilter::INFO,
            "debug" => LevelFilter::DEBUG,
            "trace" => LevelFilter::TRACE,
            other => return Err(format!("invalid log level '{other}'")),
        };
        Ok(LogLevelArg(level))
    }
}

/// Control action to send to the instance logging to a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Closes the log file and reopens it. Useful in log rotation scripts.
    Reopen,
    /// Requests the instance to stop immediately. Will interrupt any
    /// logging happening.
    Stop,
    /// Waits for the instance to stop gracefully. Useful in init script
    /// restarts where the process on stdin is exiting, as it allows
    /// logging to complete.
    Wait,
    /// Performs the wait action for 30 seconds. If the instance is still
    /// running it is then killed.
    Waitkill,
}

impl Action {
    /// String representation for display and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Reopen => "reopen",
            Action::Stop => "stop",
            Action::Wait => "wait",
            Action::Waitkill => "waitkill",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Command-line interface for pipelog.
#[derive(Parser)]
#[command(name = "plog", version, author)]
#[command(about = "Appends stdin to a log file, with signal-driven rotation control")]
#[command(
    long_about = "Appends stdin to a log file, with signal-driven rotation control.\n\n\
    With only a filename, plog starts a new instance and appends stdin to the \
    specified file. With an action, plog locates the instance currently logging \
    to the specified file and requests it to perform that action."
)]
pub struct Cli {
    /// Path of the log file to append to.
    pub filename: PathBuf,

    /// Action to request from the running instance instead of starting one.
    #[arg(value_enum)]
    pub action: Option<Action>,

    /// Override the logging verbosity for this invocation only.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

/// Parses command-line arguments and returns a `Cli` struct.
pub fn parse_args() -> Cli {
    Cli::parse()
}
