//! Structured Logger
//!
//! Wraps `tracing` to provide console output (pretty or JSON), optional
//! daily-rolling NDJSON files, and environment-based level control.

use std::io::IsTerminal;
use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log file prefix inside the configured directory.
const LOG_FILE_PREFIX: &str = "visiongate.log";

/// Logger settings resolved from config.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Fallback filter when `RUST_LOG` is unset.
    pub level: String,
    /// Emit console logs as JSON lines instead of human-readable text.
    pub json: bool,
    /// Directory for `visiongate.log.YYYY-MM-DD` files.
    pub dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            dir: None,
        }
    }
}

/// Build the filter: `RUST_LOG` wins over the configured level.
pub fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Colors only for an interactive stdout, and never when `NO_COLOR` is set.
fn ansi_enabled(stdout_is_terminal: bool, no_color: bool) -> bool {
    stdout_is_terminal && !no_color
}

/// Initialize the global structured logger.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logger(settings: &LogSettings) {
    let env_filter = build_env_filter(&settings.level);

    let console_layer = if settings.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stdout)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_ansi(ansi_enabled(
                std::io::stdout().is_terminal(),
                std::env::var_os("NO_COLOR").is_some(),
            ))
            .boxed()
    };

    let file_layer = settings.dir.as_ref().map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
            .boxed()
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_falls_back() {
        // Must not panic on garbage directives.
        let _ = build_env_filter("[[not a directive");
    }

    #[test]
    fn test_ansi_only_on_terminal() {
        assert!(ansi_enabled(true, false));
        assert!(!ansi_enabled(false, false));
        assert!(!ansi_enabled(true, true));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LogSettings {
            level: "debug".into(),
            json: true,
            dir: Some(dir.path().to_path_buf()),
        };
        init_logger(&settings);
        init_logger(&LogSettings::default());
        tracing::info!("logger initialized");
    }
}
