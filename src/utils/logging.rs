//! Per-invocation logging context.
//!
//! Everything at debug and above goes to the log file; the console shows info
//! unless `--verbose` or `RUST_LOG` asks for more. The subscriber is installed
//! as the thread default and removed again when the session is dropped.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub struct LogSession {
    log_file: PathBuf,
    _guard: DefaultGuard,
}

impl LogSession {
    pub fn start(log_file: &Path, verbose: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

        let log_level = if verbose { "debug" } else { "info" };
        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("sah_media={},warn", log_level)));

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_filter(LevelFilter::DEBUG),
            )
            .with(
                fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_ansi(std::io::stdout().is_terminal())
                    .with_target(false)
                    .with_filter(console_filter),
            );

        let guard = tracing::subscriber::set_default(subscriber);

        Ok(Self {
            log_file: log_file.to_path_buf(),
            _guard: guard,
        })
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, info};

    #[test]
    fn test_file_receives_debug_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.log");

        {
            let session = LogSession::start(&path, false).unwrap();
            assert_eq!(session.log_file(), path);
            debug!("running mkfs.ext3 -F /dev/sdb");
            info!("* Creating the SAH node usb image.");
        }
        // Session dropped: nothing below reaches the file.
        info!("after the session");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("DEBUG running mkfs.ext3 -F /dev/sdb"));
        assert!(content.contains("INFO * Creating the SAH node usb image."));
        assert!(!content.contains("after the session"));
    }

    #[test]
    fn test_appends_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.log");

        for run in 0..2 {
            let _session = LogSession::start(&path, true).unwrap();
            info!("run {}", run);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("run 0"));
        assert!(content.contains("run 1"));
    }

    #[test]
    fn test_unwritable_log_path() {
        let err = LogSession::start(Path::new("/nonexistent/dir/setup.log"), false)
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to open log file"));
    }
}
