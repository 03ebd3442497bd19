//! Diagnostic logging through `tracing`.
//!
//! The chat TUI owns the terminal, so it only logs when given a file. The
//! one-shot `say` command logs to stderr instead.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

/// Filter directives are read from this variable, falling back to `warn`.
pub const LOG_ENV_VAR: &str = "LLAMABOT_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Disabled,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Calling it twice is harmless: the second
/// install is ignored.
pub fn init_logging(target: LogTarget<'_>) -> Result<(), std::io::Error> {
    match target {
        LogTarget::Disabled => {}
        LogTarget::Stderr => {
            let _ = fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init();
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = fmt()
                .with_env_filter(env_filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_target_creates_the_log_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("llamabot.log");
        init_logging(LogTarget::File(&path)).expect("init");
        assert!(path.exists());
    }

    #[test]
    fn unwritable_log_path_is_reported() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("missing").join("llamabot.log");
        assert!(init_logging(LogTarget::File(&path)).is_err());
    }
}
