//! Logging and tracing configuration
//!
//! Diagnostics go to stderr (and optionally a daily rolling file) so that the
//! event stream on stdout stays clean JSON lines.

use std::io;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Boxed error returned by logging initialisation
pub type LoggingInitError = Box<dyn std::error::Error + Send + Sync>;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the application
    pub level: Level,
    /// Whether to enable JSON formatting
    pub json_format: bool,
    /// Whether to log to file
    pub log_to_file: bool,
    /// Log file directory (if logging to file)
    pub log_directory: Option<String>,
    /// Log file prefix (if logging to file)
    pub log_file_prefix: String,
    /// Whether to enable span events
    pub enable_span_events: bool,
    /// Whether to enable ansi colors in console output
    pub enable_ansi: bool,
    /// Custom environment filter
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            log_to_file: false,
            log_directory: None,
            log_file_prefix: "ehr-access-simulator".to_string(),
            enable_span_events: false,
            enable_ansi: true,
            env_filter: None,
        }
    }
}

/// Keeps the background log writer alive; logs are flushed when dropped
#[derive(Debug, Default)]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable JSON formatting
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Enable file logging
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        self.log_to_file = true;
        self.log_directory = Some(directory.into());
        self
    }

    /// Set log file prefix
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_file_prefix = prefix.into();
        self
    }

    /// Enable span events
    pub fn with_span_events(mut self) -> Self {
        self.enable_span_events = true;
        self
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Filter directive used when neither a custom filter nor `RUST_LOG` is set
    pub fn default_directive(&self) -> String {
        format!(
            "{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            self.level
        )
    }

    fn span_events(&self) -> FmtSpan {
        if self.enable_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Initialize the global tracing subscriber
    ///
    /// The returned guard must be held for as long as file logging should keep
    /// flushing.
    pub fn init(self) -> Result<LoggingGuard, LoggingInitError> {
        let env_filter = match &self.env_filter {
            Some(filter) => EnvFilter::try_new(filter)?,
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive())),
        };

        let console_layer = if self.json_format {
            fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_span_events(self.span_events())
                .boxed()
        } else {
            fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_ansi(self.enable_ansi)
                .with_span_events(self.span_events())
                .boxed()
        };

        let mut guard = LoggingGuard::default();
        let file_layer = if self.log_to_file {
            let log_dir = self.log_directory.as_deref().unwrap_or("logs");
            let (file_writer, file_guard) =
                non_blocking(rolling::daily(log_dir, &self.log_file_prefix));
            guard._file_guard = Some(file_guard);

            // Files always get JSON
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file_writer)
                    .with_span_events(self.span_events()),
            )
        } else {
            None
        };

        Registry::default()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        info!(
            level = %self.level,
            json = self.json_format,
            file = self.log_to_file,
            "Logging initialized"
        );
        Ok(guard)
    }

    /// Initialize verbose logging (INFO level with span events)
    pub fn init_verbose() -> Result<LoggingGuard, LoggingInitError> {
        Self::new().with_level(Level::INFO).with_span_events().init()
    }

    /// Initialize debug logging (DEBUG level with span events)
    pub fn init_debug() -> Result<LoggingGuard, LoggingInitError> {
        Self::new().with_level(Level::DEBUG).with_span_events().init()
    }
}

/// Structured log event tagged with the simulated minute it happened at
#[macro_export]
macro_rules! sim_event {
    ($level:ident, $now:expr, $message:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::$level!(
            message = $message,
            sim_minute = $now,
            component = "simulation",
            $($key = $value,)*
        );
    };
    ($level:ident, $now:expr, $message:expr) => {
        tracing::$level!(
            message = $message,
            sim_minute = $now,
            component = "simulation",
        );
    };
}
