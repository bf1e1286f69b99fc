//! Tracing subscriber setup.
//!
//! Logs go to stderr and, optionally, to a daily-rolling file. `RUST_LOG`
//! overrides the default filter.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Log file name prefix inside the log directory.
const LOG_FILE: &str = "assetloader.log";

/// Logging options.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Lower the default level to debug.
    pub verbose: bool,
    /// Also write logs to a daily file in this directory.
    pub file_dir: Option<PathBuf>,
}

impl LogOptions {
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_file_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file_dir = Some(dir.into());
        self
    }

    fn default_directives(&self) -> &'static str {
        if self.verbose {
            "assetloader=debug,assetloader_cli=debug"
        } else {
            "assetloader=info,assetloader_cli=info"
        }
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the life of the process.
pub fn init_logging(options: &LogOptions) -> Result<Option<WorkerGuard>, TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_directives()));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match &options.file_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            LogOptions::default().default_directives(),
            "assetloader=info,assetloader_cli=info"
        );
        assert!(LogOptions::default()
            .with_verbose(true)
            .default_directives()
            .contains("debug"));
    }
}
