use tracing::info;
use tracing_subscriber::EnvFilter;

use pipelog::{
    cli::{Action, Cli, parse_args},
    control,
    daemon::Daemon,
    error::PipelogError,
    registry::InstanceLock,
};

fn main() {
    let args = parse_args();
    init_logging(&args);

    if let Err(err) = run(&args) {
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}

fn run(args: &Cli) -> Result<(), PipelogError> {
    match args.action {
        None => run_daemon(args),
        Some(Action::Reopen) => control::reopen(&args.filename),
        Some(Action::Stop) => control::stop(&args.filename),
        Some(Action::Wait) => control::wait(&args.filename),
        Some(Action::Waitkill) => control::waitkill(&args.filename),
    }
}

fn run_daemon(args: &Cli) -> Result<(), PipelogError> {
    let lock = InstanceLock::acquire(&args.filename)?;
    info!(
        "pipelog instance {} claimed {:?}",
        std::process::id(),
        lock.path()
    );

    let mut daemon = Daemon::new(&args.filename)?;
    let result = daemon.run();

    // Dropping the lock releases it; the PID file stays behind.
    drop(lock);
    result
}

fn init_logging(args: &Cli) {
    let filter = if let Some(level) = args.log_level {
        EnvFilter::new(level.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stdout is never used for payload or diagnostics; logs go to stderr
    // alongside error reports.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
