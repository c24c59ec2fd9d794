//! Centralised tracing initialisation for dialint binaries.
//!
//! Call [`init_tracing`] once at program start to configure the global
//! subscriber with an `EnvFilter`, optional JSON formatting on stderr, and an
//! optional daily-rolling JSON log file.
//!
//! Safe to call more than once; subsequent calls are silently ignored
//! (the global subscriber can only be set once per process).

use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Prefix of the rolling log files (`dialint.log.YYYY-MM-DD`).
pub const LOG_FILE_PREFIX: &str = "dialint.log";

/// Initialise the global tracing subscriber.
///
/// * `json` - when `true`, emit newline-delimited JSON log lines on stderr.
/// * `level` - default verbosity when `RUST_LOG` is not set.
/// * `log_dir` - when set, also append JSON lines to a daily-rolling file in
///   that directory. A directory that cannot be created disables the file
///   sink without failing.
///
/// The returned guard flushes the file sink on drop; hold it until exit.
pub fn init_tracing(json: bool, level: Level, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let (writer, guard) = match log_dir.and_then(file_appender) {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };
    let file_layer = writer.map(|writer| {
        fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .json()
            .with_writer(writer)
    });

    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);
    if json {
        registry
            .with(fmt::layer().with_target(false).json().with_writer(std::io::stderr))
            .try_init()
            .ok();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
    guard
}

fn file_appender(dir: &Path) -> Option<RollingFileAppender> {
    std::fs::create_dir_all(dir).ok()?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_appender_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join(".dialint/logs");
        assert!(file_appender(&logs).is_some());
        assert!(logs.is_dir());
    }

    #[test]
    fn test_file_appender_tolerates_unusable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("logs");
        std::fs::write(&blocker, b"not a directory").unwrap();
        assert!(file_appender(&blocker).is_none());
    }
}
