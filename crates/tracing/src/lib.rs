//! The `tandem-tracing` crate provides a [`TandemTracer`] that sets up the global tracing
//! subscriber: a stdout layer in the chosen [`LogFormat`], and optionally a daily-rotated log file.
//!
//! ```no_run
//! use tandem_tracing::{LayerInfo, LogFormat, TandemTracer, Tracer};
//!
//! let stdout = LayerInfo::new(LogFormat::Terminal, "info".to_string(), String::new(), None);
//! let _guard = TandemTracer::new().with_stdout(stdout).init().expect("failed to init tracing");
//! ```

// Re-export tracing crates
pub use tracing;
pub use tracing_subscriber;

// Re-export LogFormat
pub use formatter::LogFormat;
pub use layers::{FileInfo, FileWorkerGuard};

mod formatter;
mod layers;

use crate::layers::Layers;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Directive, layer::SubscriberExt, util::SubscriberInitExt};

/// Tracer for application logging.
///
/// Manages the configuration and initialization of logging layers, including standard output
/// and file logging.
#[derive(Debug, Clone)]
pub struct TandemTracer {
    stdout: LayerInfo,
    file: Option<(LayerInfo, FileInfo)>,
}

impl TandemTracer {
    /// Constructs a new `TandemTracer` with a terminal stdout layer at the `INFO` level, and no
    /// file layer.
    pub fn new() -> Self {
        Self { stdout: LayerInfo::default(), file: None }
    }

    /// Sets a custom configuration for the stdout layer.
    pub fn with_stdout(mut self, config: LayerInfo) -> Self {
        self.stdout = config;
        self
    }

    /// Sets up file logging with the given layer configuration.
    pub fn with_file(mut self, config: LayerInfo, file_info: FileInfo) -> Self {
        self.file = Some((config, file_info));
        self
    }
}

impl Default for TandemTracer {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a logging layer.
#[derive(Debug, Clone)]
pub struct LayerInfo {
    format: LogFormat,
    default_directive: String,
    filters: String,
    color: Option<String>,
}

impl LayerInfo {
    /// Constructs a new `LayerInfo`.
    ///
    /// `default_directive` applies when `RUST_LOG` is unset. `filters` is a comma-separated list
    /// of additional directives. `color` is `always`, `auto` or `never`, and `None` disables
    /// ANSI output.
    pub fn new(
        format: LogFormat,
        default_directive: String,
        filters: String,
        color: Option<String>,
    ) -> Self {
        Self { format, default_directive, filters, color }
    }
}

impl Default for LayerInfo {
    fn default() -> Self {
        Self {
            format: LogFormat::Terminal,
            default_directive: LevelFilter::INFO.to_string(),
            filters: String::new(),
            color: Some("always".to_string()),
        }
    }
}

/// Trait defining a general interface for logging configuration.
pub trait Tracer {
    /// Initialize the logging configuration.
    ///
    /// Returns the guard of the file layer, if there is one. Dropping it flushes the log file.
    fn init(self) -> eyre::Result<Option<FileWorkerGuard>>;
}

impl Tracer for TandemTracer {
    fn init(self) -> eyre::Result<Option<FileWorkerGuard>> {
        let mut layers = Layers::new();

        layers.stdout(
            self.stdout.format,
            self.stdout.default_directive.parse::<Directive>()?,
            &self.stdout.filters,
            self.stdout.color,
        )?;

        let file_guard = if let Some((config, file_info)) = self.file {
            Some(layers.file(config.format, &config.filters, file_info)?)
        } else {
            None
        };

        // keep an already installed global subscriber
        let _ = tracing_subscriber::registry().with(layers.into_inner()).try_init();
        Ok(file_guard)
    }
}

/// Initializes a tracing subscriber for tests, logging at the `DEBUG` level.
///
/// Repeated calls are no-ops.
pub fn init_test_tracing() {
    let _ = TandemTracer::new()
        .with_stdout(LayerInfo::new(
            LogFormat::Terminal,
            LevelFilter::DEBUG.to_string(),
            String::new(),
            None,
        ))
        .init();
}
