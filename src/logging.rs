use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "warn";

fn make_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to stderr. Used for one-shot CLI commands.
pub(crate) fn init_stderr() {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false);

    // A second init (tests, repeated calls) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(make_filter())
        .with(layer)
        .try_init();
}

/// Log to `path`, appending. The TUI owns the terminal, so nothing may
/// reach stdout or stderr while it runs.
pub(crate) fn init_file(path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Cannot open log file: {}", path.display()))?;

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(make_filter())
        .with(layer)
        .try_init();
    Ok(())
}
