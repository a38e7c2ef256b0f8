//! Logging System for the track file server
//!
//! Provides structured logging with:
//! - Configurable verbosity, globally and per module
//! - Text or JSON output to console, file, or both
//! - Rolling log files written off the hot path

mod config;


pub use self::config::{LogFormat, LogLevel, LogOutput, LoggingConfig, RotationStrategy};

use std::path::PathBuf;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logging system errors
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to initialize logging: {0}")]
    InitializationError(String),

    #[error("Failed to create log directory {path:?}: {source}")]
    DirectoryCreationError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for logging operations
pub type LoggingResult<T> = Result<T, LoggingError>;

/// Installed logging state; keep it alive so buffered file output is flushed
pub struct LoggingSystem {
    config: LoggingConfig,
    _guards: Vec<WorkerGuard>,
}

impl LoggingSystem {
    /// Initialize the logging system with the given configuration
    pub fn init(config: LoggingConfig) -> LoggingResult<Self> {
        let writes_file = matches!(config.output, LogOutput::File | LogOutput::Both);

        // Ensure log directory exists
        if writes_file {
            let log_dir = Self::log_dir(&config);
            std::fs::create_dir_all(&log_dir).map_err(|source| {
                LoggingError::DirectoryCreationError {
                    path: log_dir.clone(),
                    source,
                }
            })?;
        }

        let mut guards = Vec::new();
        let env_filter = Self::build_env_filter(&config);
        let registry = tracing_subscriber::registry().with(env_filter);

        match config.output {
            LogOutput::Console => registry
                .with(Self::create_console_layer(&config))
                .try_init()
                .map_err(|e| LoggingError::InitializationError(e.to_string()))?,
            LogOutput::File => {
                let (file_layer, guard) = Self::create_file_layer(&config);
                guards.push(guard);
                registry
                    .with(file_layer)
                    .try_init()
                    .map_err(|e| LoggingError::InitializationError(e.to_string()))?
            }
            LogOutput::Both => {
                let (file_layer, guard) = Self::create_file_layer(&config);
                guards.push(guard);
                registry
                    .with(Self::create_console_layer(&config))
                    .with(file_layer)
                    .try_init()
                    .map_err(|e| LoggingError::InitializationError(e.to_string()))?
            }
        }

        Ok(Self {
            config,
            _guards: guards,
        })
    }

    /// Build environment filter from configuration
    ///
    /// `RUST_LOG` directives, when set, are layered on top.
    fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
        let mut filter = EnvFilter::new(config.level.to_string());

        for (module, level) in &config.module_levels {
            if let Ok(directive) = format!("{}={}", module, level).parse() {
                filter = filter.add_directive(directive);
            }
        }

        if let Ok(overrides) = std::env::var(EnvFilter::DEFAULT_ENV) {
            for directive in overrides.split(',').filter_map(|d| d.parse().ok()) {
                filter = filter.add_directive(directive);
            }
        }

        filter
    }

    /// Create console logging layer
    fn create_console_layer<S>(config: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_thread_ids(config.include_thread_id)
            .with_file(config.include_file_info)
            .with_line_number(config.include_file_info);

        if config.format == LogFormat::Json {
            layer.json().boxed()
        } else {
            layer.boxed()
        }
    }

    /// Create file logging layer with rotation
    fn create_file_layer<S>(config: &LoggingConfig) -> (Box<dyn Layer<S> + Send + Sync>, WorkerGuard)
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        let rotation = match config.rotation {
            RotationStrategy::Daily => Rotation::DAILY,
            RotationStrategy::Hourly => Rotation::HOURLY,
            RotationStrategy::Never => Rotation::NEVER,
        };

        let file_appender =
            RollingFileAppender::new(rotation, Self::log_dir(config), "track-file-server.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_target(config.include_target)
            .with_thread_ids(config.include_thread_id)
            .with_file(config.include_file_info)
            .with_line_number(config.include_file_info)
            .with_ansi(false); // No ANSI colors in file output

        if config.format == LogFormat::Json {
            (layer.json().boxed(), guard)
        } else {
            (layer.boxed(), guard)
        }
    }

    /// Configuration this system was installed with
    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    fn log_dir(config: &LoggingConfig) -> PathBuf {
        config
            .log_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("logs"))
    }
}
