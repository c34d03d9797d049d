//! Logging setup for fids.
//!
//! Log lines normally go to stderr. While the board is drawing in raw mode
//! they would tear the frame, so the `display` command sends them to a file
//! instead (see [`LogOutput`]).

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Info and above.
    #[default]
    Normal,
    /// Debug and above.
    Verbose,
    /// Everything.
    Trace,
}

impl Verbosity {
    /// The most detailed level this verbosity lets through.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// Standard error, with colours.
    #[default]
    Stderr,
    /// Appended to a plain-text file.
    File(PathBuf),
}

/// Initialize logging to stderr.
///
/// `RUST_LOG` overrides the level chosen by `verbosity`.
///
/// # Examples
///
/// ```no_run
/// use fids::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    // Stderr needs no setup that can fail.
    let _ = init_logging_to(verbosity, &LogOutput::Stderr);
}

/// Initialize logging to the given output.
///
/// A second call is a no-op; the first subscriber stays installed.
///
/// # Errors
///
/// Returns an error if the log file or its directory cannot be created.
pub fn init_logging_to(verbosity: Verbosity, output: &LogOutput) -> Result<()> {
    let default_filter = format!("fids={}", verbosity.to_level_filter());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let (writer, ansi) = match output {
        LogOutput::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        LogOutput::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .with_thread_ids(false),
    );
    let _ = subscriber.try_init();
    Ok(())
}

/// Quiet logging for unit tests.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_to_level() {
        assert_eq!(Verbosity::Quiet.to_level_filter(), Level::ERROR);
        assert_eq!(Verbosity::Normal.to_level_filter(), Level::INFO);
        assert_eq!(Verbosity::Verbose.to_level_filter(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.to_level_filter(), Level::TRACE);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
        assert_eq!(LogOutput::default(), LogOutput::Stderr);
    }

    #[test]
    fn test_file_output_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("fids-log-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("fids.log");

        init_logging_to(Verbosity::Quiet, &LogOutput::File(path.clone())).unwrap();
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let dir = std::env::temp_dir().join(format!("fids-log-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        // A directory cannot be opened as a log file.
        let result = init_logging_to(Verbosity::Normal, &LogOutput::File(dir.clone()));
        assert!(result.is_err());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_repeated_init_does_not_panic() {
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Trace);
        init_test_logging();
    }
}
