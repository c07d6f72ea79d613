//! # Logger
//!
//! Installs the global `tracing` subscriber for Sprout binaries.
//!
//! * Console output (compact, ANSI) is on by default.
//! * [`LoggerBuilder::path`] adds a non-blocking rolling file appender; file-only knobs
//!   ([`LoggerBuilder::rotation`], [`LoggerBuilder::max_files`], [`LoggerBuilder::json`])
//!   become available only after a path is set.
//! * `RUST_LOG` is honoured unless an explicit [`LoggerBuilder::env_filter`] is given.
//!
//! ## Example
//!
//! ```rust
//! use sprout_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("sprout-server")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//!
//! tracing::info!("ready");
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug)]
struct FileSink {
    dir: PathBuf,
    rotation: Rotation,
    max_files: usize,
    json: bool,
}

#[derive(Debug)]
struct LoggerConfig {
    console: bool,
    level: LevelFilter,
    env_filter: Option<String>,
    file: Option<FileSink>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { console: true, level: LevelFilter::INFO, env_filter: None, file: None }
    }
}

/// Type-state marker: no logger name yet.
#[derive(Debug)]
pub struct Unnamed;
/// Type-state marker: logger name set.
#[derive(Debug)]
pub struct Named(String);
/// Type-state marker: console only.
#[derive(Debug)]
pub struct ConsoleOnly;
/// Type-state marker: rolling file output configured.
#[derive(Debug)]
pub struct WithFile;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Unnamed {}
    impl Sealed for super::Named {}
    impl Sealed for super::ConsoleOnly {}
    impl Sealed for super::WithFile {}
}

/// Builder for the global tracing subscriber. Obtain one with [`Logger::builder`].
#[derive(Debug)]
pub struct LoggerBuilder<N: sealed::Sealed = Unnamed, F: sealed::Sealed = ConsoleOnly> {
    config: LoggerConfig,
    name: N,
    _file: PhantomData<F>,
}

impl<F: sealed::Sealed> LoggerBuilder<Unnamed, F> {
    /// Names the logger. The name prefixes rolling log files (`<name>.<date>.log`).
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named, F> {
        LoggerBuilder { config: self.config, name: Named(name.into()), _file: PhantomData }
    }
}

impl<F: sealed::Sealed> LoggerBuilder<Named, F> {
    #[must_use]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Programmatic filter directives, e.g. `sprout=debug,hyper=info`.
    ///
    /// Takes precedence over `RUST_LOG`. Invalid directives make [`Self::init`] fail.
    #[must_use]
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        self.config.env_filter = Some(directives.into());
        self
    }

    #[must_use]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Writes logs to rolling files under `dir` (created if missing).
    pub fn path(self, dir: impl Into<PathBuf>) -> LoggerBuilder<Named, WithFile> {
        let mut config = self.config;
        config.file = Some(FileSink {
            dir: dir.into(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
        });
        LoggerBuilder { config, name: self.name, _file: PhantomData }
    }

    /// Installs the subscriber globally.
    ///
    /// Keep the returned [`Logger`] alive until shutdown; dropping it stops the
    /// background file writer.
    ///
    /// # Errors
    ///
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero `max_files`,
    ///   a bad filter, or when no output is enabled.
    /// * [`LoggerError::Appender`] / [`LoggerError::Internal`] when the log directory
    ///   cannot be prepared.
    /// * [`LoggerError::Subscriber`] when a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Named(name) = self.name;
        validate(&self.config, &name)?;

        let filter = env_filter(&self.config)?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if self.config.console {
            layers.push(fmt::layer().compact().with_ansi(true).boxed());
        }

        let guard = match self.config.file {
            Some(sink) => {
                let (layer, guard) = file_layer(&name, sink)?;
                layers.push(layer);
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "no output enabled; turn on the console or set a log path".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;

        Ok(Logger { guard })
    }
}

impl LoggerBuilder<Named, WithFile> {
    #[must_use]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(sink) = self.config.file.as_mut() {
            sink.rotation = rotation;
        }
        self
    }

    /// Number of rotated files to retain.
    #[must_use]
    pub fn max_files(mut self, max: usize) -> Self {
        if let Some(sink) = self.config.file.as_mut() {
            sink.max_files = max;
        }
        self
    }

    /// Emits file logs as JSON lines.
    #[must_use]
    pub fn json(mut self) -> Self {
        if let Some(sink) = self.config.file.as_mut() {
            sink.json = true;
        }
        self
    }
}

/// Handle to the installed logging system.
#[must_use = "dropping the logger stops the background file writer"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig::default(), name: Unnamed, _file: PhantomData }
    }

    /// Whether a file writer is running behind this handle.
    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logger shutting down, flushing file output");
        }
    }
}

fn validate(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "logger name cannot be empty".into(),
            context: None,
        });
    }
    if config.file.as_ref().is_some_and(|sink| sink.max_files == 0) {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    match &config.env_filter {
        None => Ok(builder.from_env_lossy()),
        Some(directives) => {
            builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("invalid env filter '{directives}': {e}").into(),
                context: None,
            })
        },
    }
}

fn file_layer(name: &str, sink: FileSink) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
    std::fs::create_dir_all(&sink.dir)
        .map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: None,
        })
        .context(format!("Failed to create log directory {}", sink.dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(sink.rotation)
        .filename_prefix(name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(sink.max_files)
        .build(&sink.dir)
        .context(format!("Failed to open rolling log in {}", sink.dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = fmt::layer().with_writer(writer).with_ansi(false);
    let layer: BoxedLayer = if sink.json { layer.json().boxed() } else { layer.boxed() };

    Ok((layer, guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn builder_defaults() {
        let builder = Logger::builder().name("sprout-test");
        assert!(builder.config.console);
        assert_eq!(builder.config.level, LevelFilter::INFO);
        assert!(builder.config.env_filter.is_none());
        assert!(builder.config.file.is_none());
    }

    #[test]
    fn file_options_apply_to_sink() {
        let builder = Logger::builder()
            .name("sprout-test")
            .env_filter("sprout=debug")
            .path("logs")
            .rotation(Rotation::HOURLY)
            .max_files(3)
            .json();

        let sink = builder.config.file.as_ref().expect("file sink configured");
        assert_eq!(sink.dir, PathBuf::from("logs"));
        assert_eq!(sink.max_files, 3);
        assert!(sink.json);
        assert_eq!(builder.config.env_filter.as_deref(), Some("sprout=debug"));
    }

    #[test]
    fn rejects_blank_name() {
        let err = Logger::builder().name("  ").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn rejects_zero_max_files() {
        let err = Logger::builder().name("sprout-test").path("logs").max_files(0).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn rejects_bad_filter() {
        let err = Logger::builder().name("sprout-test").env_filter("sprout=notalevel").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn rejects_no_outputs() {
        let err = Logger::builder().name("sprout-test").console(false).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn file_output_creates_log_file() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempdir()?;
        let dir = tmp.path().join("logs");

        let logger = Logger::builder().name("sprout-test").console(false).path(&dir).init()?;
        assert!(logger.has_file_output());

        tracing::info!("hello from the file sink");
        std::thread::sleep(Duration::from_millis(20));
        drop(logger);

        let has_log = std::fs::read_dir(&dir)?
            .flatten()
            .any(|entry| entry.path().extension().and_then(|e| e.to_str()) == Some("log"));
        assert!(has_log, "a .log file should exist in {}", dir.display());
        Ok(())
    }
}
