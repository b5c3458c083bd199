use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

/// Log file written next to the working directory unless told otherwise.
pub const DEFAULT_LOG_FILE: &str = "mission_analyzer.log";

/// Install the global logger.
///
/// `RUST_LOG` overrides the default `info` filter. With a file the log goes
/// there (truncated each run), otherwise it goes to stderr.
///
/// # Errors
/// Returns an error if the log file cannot be created or a logger is already set.
pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        let file = File::create(path).with_context(|| format!("creating log file '{}'", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.try_init().context("installing logger")
}
