//! Tracing subscriber setup
//!
//! Shared between the binary and tests: everything goes to a log file so the
//! terminal stays free for the editor's own output.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber writing to `log_file_path`.
///
/// Returns false if the file could not be created or a global subscriber
/// is already set.
pub fn init_global(log_file_path: &Path) -> bool {
    let Ok(log_file) = File::create(log_file_path) else {
        return false;
    };
    build_subscriber(log_file).try_init().is_ok()
}

/// `RUST_LOG` if set, otherwise `info`
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Build the file-logging subscriber
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_subscriber_writes_to_file() {
        let log_file = NamedTempFile::new().unwrap();
        let subscriber = build_subscriber(log_file.reopen().unwrap());

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("document save failed");
        });

        let contents = std::fs::read_to_string(log_file.path()).expect("Failed to read log");
        assert!(contents.contains("WARN"), "Log should contain WARN level");
        assert!(
            contents.contains("document save failed"),
            "Log should contain message"
        );
    }

    #[test]
    fn test_trace_is_filtered_by_default() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let log_file = NamedTempFile::new().unwrap();
        let subscriber = build_subscriber(log_file.reopen().unwrap());

        tracing::subscriber::with_default(subscriber, || {
            tracing::trace!("propagation detail");
        });

        let contents = std::fs::read_to_string(log_file.path()).unwrap_or_default();
        assert!(!contents.contains("propagation detail"));
    }
}
