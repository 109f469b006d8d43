//! Logging setup shared by the keycalc binaries

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
    /// Enable console output (stderr)
    pub console: bool,
    /// Optional log file, rotated daily
    pub file: Option<String>,
    /// Log format
    pub format: LogFormat,
    /// Enable ANSI colors in console output
    pub ansi: bool,
    /// Include span enter/exit events
    pub span_events: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            console: true,
            file: None,
            format: LogFormat::Compact,
            ansi: true,
            span_events: false,
        }
    }
}

impl LogConfig {
    /// Raise the level by `verbosity` steps above the configured one
    ///
    /// `-v` gives info, `-vv` debug, `-vvv` trace. Zero keeps the configured
    /// level untouched.
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        let level = match verbosity {
            0 => return self,
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        self.level = level.to_string();
        self
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.level)
            .or_else(|_| EnvFilter::try_new("warn"))
            .map_err(|e| Error::config(format!("Invalid log level: {}", e)))
    }
}

fn fmt_layer<S, W>(
    config: &LogConfig,
    writer: W,
    ansi: bool,
) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let span_events = if config.span_events {
        FmtSpan::FULL
    } else {
        FmtSpan::NONE
    };
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_span_events(span_events);

    match config.format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

/// Initialize logging with the given configuration
///
/// Returns a guard that must be kept alive for file logging to work
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let mut layers = Vec::new();
    let mut guard = None;

    if config.console {
        layers.push(
            fmt_layer(config, std::io::stderr, config.ansi)
                .with_filter(config.env_filter()?)
                .boxed(),
        );
    }

    if let Some(file_path) = &config.file {
        let path = Path::new(file_path);
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(directory)?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("keycalc.log");
        let file_appender = tracing_appender::rolling::daily(directory, file_name);
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        layers.push(
            fmt_layer(config, non_blocking, false)
                .with_filter(config.env_filter()?)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;

    Ok(guard)
}
