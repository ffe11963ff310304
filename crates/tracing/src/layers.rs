use std::path::PathBuf;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{filter::Directive, EnvFilter, Layer, Registry};

use crate::formatter::LogFormat;

/// A worker guard returned by the file layer.
///
/// When a guard is dropped, all events currently in-memory are flushed to the log file this guard
/// belongs to.
pub type FileWorkerGuard = WorkerGuard;

/// A boxed tracing [Layer].
pub(crate) type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Directives applied to every filter, silencing noisy dependencies.
const DEFAULT_ENV_FILTER_DIRECTIVES: [&str; 1] = ["mio=off"];

/// Manages the collection of layers for a tracing subscriber.
pub(crate) struct Layers {
    inner: Vec<BoxedLayer<Registry>>,
}

impl Layers {
    /// Creates a new `Layers` instance.
    pub(crate) fn new() -> Self {
        Self { inner: vec![] }
    }

    /// Consumes the `Layers` instance, returning the inner vector of layers.
    pub(crate) fn into_inner(self) -> Vec<BoxedLayer<Registry>> {
        self.inner
    }

    /// Adds a stdout layer with specified formatting and filtering.
    pub(crate) fn stdout(
        &mut self,
        format: LogFormat,
        default_directive: Directive,
        filters: &str,
        color: Option<String>,
    ) -> eyre::Result<()> {
        let filter = build_env_filter(Some(default_directive), filters)?;
        let layer = format.apply(filter, color, None);
        self.inner.push(layer);
        Ok(())
    }

    /// Adds a file logging layer to the layers collection.
    pub(crate) fn file(
        &mut self,
        format: LogFormat,
        filter: &str,
        file_info: FileInfo,
    ) -> eyre::Result<FileWorkerGuard> {
        let (writer, guard) = file_info.create_log_writer();
        let file_filter = build_env_filter(None, filter)?;
        let layer = format.apply(file_filter, None, Some(writer));
        self.inner.push(layer);
        Ok(guard)
    }
}

/// Holds the configuration information for file logging.
#[derive(Debug, Clone)]
pub struct FileInfo {
    dir: PathBuf,
    file_name: String,
}

impl FileInfo {
    /// Creates a new `FileInfo` instance. Logs are rotated daily.
    pub fn new(dir: PathBuf, file_name: String) -> Self {
        Self { dir, file_name }
    }

    /// Creates a non-blocking writer for the log file.
    fn create_log_writer(&self) -> (NonBlocking, WorkerGuard) {
        let appender = tracing_appender::rolling::daily(&self.dir, &self.file_name);
        tracing_appender::non_blocking(appender)
    }
}

/// Builds an environment filter for logging.
///
/// The filter starts from `RUST_LOG`, falls back to `default_directive` (or `off`), and then
/// applies the comma-separated `directives`.
pub(crate) fn build_env_filter(
    default_directive: Option<Directive>,
    directives: &str,
) -> eyre::Result<EnvFilter> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_directive.unwrap_or_else(|| LevelFilter::OFF.into()))
        .from_env_lossy();

    DEFAULT_ENV_FILTER_DIRECTIVES
        .into_iter()
        .chain(directives.split(',').filter(|directive| !directive.is_empty()))
        .try_fold(env_filter, |env_filter, directive| {
            Ok::<_, eyre::Report>(env_filter.add_directive(directive.parse()?))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_env_filter_accepts_directives() {
        assert!(build_env_filter(Some(LevelFilter::INFO.into()), "tandem_vm=trace,").is_ok());
        assert!(build_env_filter(None, "").is_ok());
    }

    #[test]
    fn test_build_env_filter_rejects_garbage() {
        assert!(build_env_filter(None, "tandem_vm=loud").is_err());
    }
}
