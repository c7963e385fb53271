use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::Result;

/// Where log lines go.
pub enum LogTarget<'a> {
    Stderr,
    /// Appended to a file; used while the terminal UI owns the screen.
    File(&'a Path),
}

/// Pick the filter: explicit flag, then `RUST_LOG`, then the configured level.
fn build_filter(cli_level: Option<&str>, configured: &str) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
}

/// Install the global subscriber. Safe to call once per process.
pub fn init(cli_level: Option<&str>, configured: &str, target: LogTarget<'_>) -> Result<()> {
    let filter = build_filter(cli_level, configured);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match target {
        LogTarget::Stderr => {
            builder.with_writer(std::io::stderr).init();
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
    }
    Ok(())
}
